use std::io::BufRead;

use log::trace;
use utf8_chars::BufReadCharsExt;

use crate::error::{Error, Result};

/// A name line and its concatenated sequence lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// The complete header line without the leading `>`.
    pub name: String,
    pub sequence: String,
}

/// Parse all records of a fasta alignment.
///
/// Sequence lines are concatenated with line breaks removed.
/// Any other character is kept, so that it can be rejected during encoding.
pub fn parse_records(reader: impl BufRead) -> Result<Vec<RawRecord>> {
    enum State {
        FileStart,
        ParseName,
        ParseSequence,
    }

    let mut input = CharacterIterator::new(reader);
    let mut state = State::FileStart;
    let mut current_record = RawRecord {
        name: String::new(),
        sequence: String::new(),
    };
    let mut records = Vec::new();

    'parser: loop {
        match state {
            State::FileStart => 'find_first_record: loop {
                match input.next() {
                    Some(result) => match result? {
                        Character::Newline => {}
                        Character::RecordStart => {
                            state = State::ParseName;
                            break 'find_first_record;
                        }
                        Character::Other(c) => {
                            if !c.is_whitespace() {
                                return Err(Error::MissingNameMarker { found: c });
                            }
                        }
                    },
                    None => return Err(Error::NoRecords),
                }
            },
            State::ParseName => 'collect_name: loop {
                match input.next() {
                    Some(result) => match result? {
                        Character::Newline => {
                            state = State::ParseSequence;
                            break 'collect_name;
                        }
                        Character::RecordStart => current_record.name.push('>'),
                        Character::Other(c) => current_record.name.push(c),
                    },
                    None => {
                        records.push(current_record);
                        break 'parser;
                    }
                }
            },
            State::ParseSequence => {
                let mut newline = true;

                'collect_sequence: loop {
                    match input.next() {
                        Some(result) => match result? {
                            Character::Newline => newline = true,
                            Character::RecordStart => {
                                if newline {
                                    trace!("Parsed record {}", current_record.name);
                                    records.push(std::mem::replace(
                                        &mut current_record,
                                        RawRecord {
                                            name: String::new(),
                                            sequence: String::new(),
                                        },
                                    ));
                                    state = State::ParseName;
                                    break 'collect_sequence;
                                } else {
                                    current_record.sequence.push('>');
                                }
                            }
                            Character::Other(c) => {
                                current_record.sequence.push(c);
                                newline = false;
                            }
                        },
                        None => {
                            records.push(current_record);
                            break 'parser;
                        }
                    }
                }
            }
        }
    }

    Ok(records)
}

enum Character {
    Newline,
    RecordStart,
    Other(char),
}

struct CharacterIterator<Reader> {
    reader: Reader,
}

impl<Reader: BufRead> CharacterIterator<Reader> {
    fn new(reader: Reader) -> Self {
        Self { reader }
    }
}

impl<Reader: BufRead> Iterator for CharacterIterator<Reader> {
    type Item = Result<Character>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader
            .read_char()
            .map(|character| {
                character.map(|c| {
                    if c == '\n' || c == '\r' {
                        Character::Newline
                    } else if c == '>' {
                        Character::RecordStart
                    } else {
                        Character::Other(c)
                    }
                })
            })
            .map_err(Error::from)
            .transpose()
    }
}
