//! Class-file constant pool decoding.
//!
//! Only the fixed header and the constant pool are read; the class body is
//! never needed because every field/method reference a class makes appears
//! as a `Fieldref`/`Methodref`/`InterfaceMethodref` pool entry. Any
//! structural defect fails the whole buffer so the scanner can skip the
//! class and keep going.

use thiserror::Error;

use crate::symbol::{MemberKind, Symbol};

const MAGIC: u32 = 0xCAFE_BABE;
/// JDK 1.1 class files start at major version 45; anything below is not a
/// class file at all.
const MIN_MAJOR_VERSION: u16 = 45;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported class file version {major}")]
    UnsupportedVersion { major: u16 },
    #[error("unknown constant pool tag {tag}")]
    UnknownConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid UTF-8 string in constant pool: {0}")]
    Utf8Decode(#[from] std::string::FromUtf8Error),
}

/// Decodes one raw class buffer and returns every member reference its
/// constant pool makes, in pool order, without deduplication.
pub fn parse_references(bytes: &[u8]) -> Result<Vec<Symbol>, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    if reader.read_u4()? != MAGIC {
        return Err(ClassParseError::InvalidMagic);
    }
    let _minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    if major_version < MIN_MAJOR_VERSION {
        return Err(ClassParseError::UnsupportedVersion {
            major: major_version,
        });
    }

    let pool = ConstantPool::parse(&mut reader)?;
    pool.member_references()
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class {
        name_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MemberRef {
        kind: MemberKind,
        class_index: u16,
        name_and_type_index: u16,
    },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(String::from_utf8(bytes.to_vec())?)
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    // Long and Double occupy two pool slots.
                    reader.skip(8)?;
                    entries.push(Constant::Unusable);
                    index += 1;
                    Constant::Other
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                9 | 10 | 11 => {
                    // Interface-method refs count as plain method symbols.
                    let kind = if tag == 9 {
                        MemberKind::Field
                    } else {
                        MemberKind::Method
                    };
                    let class_index = reader.read_u2()?;
                    let name_and_type_index = reader.read_u2()?;
                    Constant::MemberRef {
                        kind,
                        class_index,
                        name_and_type_index,
                    }
                }
                12 => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                16 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnknownConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn member_references(&self) -> Result<Vec<Symbol>, ClassParseError> {
        let mut symbols = Vec::new();
        for entry in &self.entries {
            if let Constant::MemberRef {
                kind,
                class_index,
                name_and_type_index,
            } = entry
            {
                let owner = self.class_name(*class_index)?;
                let (member, signature) = self.name_and_type(*name_and_type_index)?;
                symbols.push(Symbol::new(owner, member, signature, *kind));
            }
        }
        Ok(symbols)
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn name_and_type(&self, index: u16) -> Result<(&str, &str), ClassParseError> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(ClassParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let slice = self.read_slice(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let slice = self.read_slice(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(ClassParseError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(ClassParseError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len)?;
        Ok(())
    }
}
