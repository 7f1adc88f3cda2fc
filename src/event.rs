use crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// A listener saw the store change.
    StoreChanged,
    /// Highlighted markup for file `file` of the mounted diff view.
    Highlighted { view: u64, file: usize, markup: String },
}
