//! Note payload parsing module.

mod note_parser;

pub use note_parser::NoteParser;
