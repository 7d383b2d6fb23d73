//! Opcode and event schema registry
//!
//! Every command and event this library knows of is described by a static table entry. A table
//! entry lists the fields of its parameters as `(name, offset, width)` triples over the raw
//! parameter bytes. The tables come in *extensions*, the standard HCI tables in [`base`] and the
//! BlueNRG-MS ACI tables in [`vendor`], which are merged once by a [`RegistryBuilder`] into a
//! [`Registry`].
//!
//! A few commands and events differ between the two BlueNRG-MS firmware stacks (IDB05A1 and
//! IDB04A1). Their table entries carry one layout per [`Variant`], and the registry resolves them
//! for the variant it was built for. After construction no per variant lookup remains.
//!
//! Hot paths never look up a field by name. Code that reads a field uses a [`Field`] constant
//! (the same constant the table is built from) with a [`LayoutReader`].

/// Create a [`Layout`] from `name @ offset: width` entries
macro_rules! layout {
    ( $( $name:ident @ $off:literal : $width:expr ),* $(,)? ) => {
        $crate::hci::schema::Layout(&[
            $( $crate::hci::schema::Field { name: stringify!($name), offset: $off, width: $width }, )*
        ])
    };
}

pub mod base;
pub mod vendor;

use super::OpCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The width of a field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    U8,
    I8,
    U16,
    U32,
    /// A fixed length byte array
    Bytes(usize),
    /// Every remaining byte of the parameters
    ///
    /// A tail can only be the last field of a layout.
    Tail,
}

impl Width {
    /// The number of bytes of the width or `None` for `Tail`
    pub fn size(&self) -> Option<usize> {
        match self {
            Width::U8 | Width::I8 => Some(1),
            Width::U16 => Some(2),
            Width::U32 => Some(4),
            Width::Bytes(len) => Some(*len),
            Width::Tail => None,
        }
    }
}

/// A field of a layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub width: Width,
}

impl Field {
    pub const fn u8(name: &'static str, offset: usize) -> Self {
        Field { name, offset, width: Width::U8 }
    }

    pub const fn i8(name: &'static str, offset: usize) -> Self {
        Field { name, offset, width: Width::I8 }
    }

    pub const fn u16(name: &'static str, offset: usize) -> Self {
        Field { name, offset, width: Width::U16 }
    }

    pub const fn u32(name: &'static str, offset: usize) -> Self {
        Field { name, offset, width: Width::U32 }
    }

    pub const fn bytes(name: &'static str, offset: usize, len: usize) -> Self {
        Field {
            name,
            offset,
            width: Width::Bytes(len),
        }
    }

    pub const fn tail(name: &'static str, offset: usize) -> Self {
        Field {
            name,
            offset,
            width: Width::Tail,
        }
    }

    /// The offset one past the end of this field, `None` for a tail
    pub fn end(&self) -> Option<usize> {
        self.width.size().map(|size| self.offset + size)
    }
}

/// An ordered list of fields over a raw parameter buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout(pub &'static [Field]);

impl Layout {
    pub const EMPTY: Layout = Layout(&[]);

    pub fn fields(&self) -> &'static [Field] {
        self.0
    }

    /// The least number of bytes a buffer must have to hold every fixed field
    pub fn min_len(&self) -> usize {
        self.0
            .iter()
            .map(|f| f.end().unwrap_or(f.offset))
            .max()
            .unwrap_or_default()
    }

    /// The exact length of the parameters, or `None` when the layout ends with a tail
    pub fn fixed_len(&self) -> Option<usize> {
        if self.has_tail() {
            None
        } else {
            Some(self.min_len())
        }
    }

    pub fn has_tail(&self) -> bool {
        self.0.iter().any(|f| f.width == Width::Tail)
    }

    /// Check if the first byte of the layout is a status code
    pub fn leads_with_status(&self) -> bool {
        self.0
            .first()
            .map(|f| f.name == "status" && f.offset == 0 && f.width == Width::U8)
            .unwrap_or_default()
    }

    /// Find a field by name
    ///
    /// This is for diagnostics and tests, typed views use field constants instead.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Decode every field of `buf` into a list of values
    pub fn decode(&self, buf: &[u8]) -> Result<Vec<Value>, CodecError> {
        let reader = LayoutReader::new(*self, buf)?;

        self.0.iter().map(|field| reader.value(field)).collect()
    }

    /// Encode a list of values, one per field
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>, CodecError> {
        let mut writer = LayoutWriter::new(*self);

        for (index, field) in self.0.iter().enumerate() {
            let value = values.get(index).ok_or(CodecError::MissingValue(field.name))?;

            writer.set_value(field, value)?;
        }

        Ok(writer.finish())
    }
}

/// The hardware variant of the BlueNRG-MS stack
///
/// The IDB05A1 stack (firmware 7.x) is the default. The IDB04A1 stack (firmware 6.x) uses a
/// different layout for a handful of GAP, GATT and L2CAP commands and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    Idb05a1,
    Idb04a1,
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Idb05a1
    }
}

/// Parameters of a command or event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Params {
    /// There are no parameters
    None,
    Fixed(Layout),
    /// The parameters are made of length prefixed fields and cannot be described by a layout
    Variable,
    /// The layout depends on the hardware variant
    ByVariant(&'static [(Variant, Layout)]),
}

impl Params {
    /// Resolve the parameters for a variant
    ///
    /// The returned parameters are never `ByVariant`
    pub fn resolve(&self, variant: Variant, name: &'static str) -> Result<Params, SchemaError> {
        match self {
            Params::ByVariant(table) => table
                .iter()
                .find(|(v, _)| *v == variant)
                .map(|(_, layout)| Params::Fixed(*layout))
                .ok_or(SchemaError::NoLayoutForVariant(name, variant)),
            other => Ok(*other),
        }
    }

    pub fn layout(&self) -> Option<Layout> {
        match self {
            Params::None => Some(Layout::EMPTY),
            Params::Fixed(layout) => Some(*layout),
            _ => None,
        }
    }
}

/// The event that terminates a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// A Command Complete event with the command's opcode
    CommandComplete,
    /// A Command Status event with the command's opcode
    CommandStatus,
    /// An LE meta event with the given sub event code
    LeMeta(u8),
    /// A vendor event with the given sub event code
    Vendor(u16),
}

/// A command table entry
#[derive(Clone, Copy, Debug)]
pub struct CommandDescriptor {
    pub ocf: u16,
    pub name: &'static str,
    pub request: Params,
    pub response: Params,
    pub completion: Completion,
}

impl CommandDescriptor {
    /// Create a descriptor of a command completed by a Command Complete event
    pub const fn new(ocf: u16, name: &'static str, request: Params, response: Params) -> Self {
        CommandDescriptor {
            ocf,
            name,
            request,
            response,
            completion: Completion::CommandComplete,
        }
    }

    pub const fn completed_by(self, completion: Completion) -> Self {
        CommandDescriptor { completion, ..self }
    }
}

/// An Opcode Group
#[derive(Clone, Copy, Debug)]
pub struct GroupDescriptor {
    pub ogf: u16,
    pub name: &'static str,
    pub commands: &'static [CommandDescriptor],
}

/// Width of the sub event code of a meta event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubCodeWidth {
    U8,
    U16,
}

impl SubCodeWidth {
    pub fn size(&self) -> usize {
        match self {
            SubCodeWidth::U8 => 1,
            SubCodeWidth::U16 => 2,
        }
    }
}

/// An event table entry
///
/// For top level events `code` is the event code. For entries of a sub table `code` is the sub
/// event code.
#[derive(Clone, Copy, Debug)]
pub struct EventDescriptor {
    pub code: u16,
    pub name: &'static str,
    pub params: Params,
    /// Set for events whose parameters start with a sub event code
    pub sub_code: Option<SubCodeWidth>,
}

impl EventDescriptor {
    pub const fn new(code: u16, name: &'static str, params: Params) -> Self {
        EventDescriptor {
            code,
            name,
            params,
            sub_code: None,
        }
    }

    pub const fn with_sub_events(self, width: SubCodeWidth) -> Self {
        EventDescriptor {
            sub_code: Some(width),
            ..self
        }
    }
}

/// Sub events of a meta event
#[derive(Clone, Copy, Debug)]
pub struct SubEvents {
    pub parent: u8,
    pub events: &'static [EventDescriptor],
}

/// A set of tables merged into a registry
#[derive(Clone, Copy, Debug)]
pub struct Extension {
    pub name: &'static str,
    pub groups: &'static [GroupDescriptor],
    pub events: &'static [EventDescriptor],
    pub sub_events: &'static [SubEvents],
}

/// A command with its parameters resolved for a variant
#[derive(Clone, Copy, Debug)]
pub struct ResolvedCommand {
    pub opcode: OpCode,
    pub group: &'static str,
    pub name: &'static str,
    pub request: Params,
    pub response: Params,
    pub completion: Completion,
    /// The first byte of the response is a status code
    pub response_has_status: bool,
}

/// An event with its parameters resolved for a variant
#[derive(Clone, Copy, Debug)]
pub struct ResolvedEvent {
    pub code: u16,
    pub name: &'static str,
    pub params: Params,
}

#[derive(Debug)]
struct EventEntry {
    event: ResolvedEvent,
    sub_code: Option<SubCodeWidth>,
    sub_events: BTreeMap<u16, ResolvedEvent>,
}

/// Builder of a [`Registry`]
///
/// Extensions are merged in the order they are added.
pub struct RegistryBuilder {
    variant: Variant,
    extensions: Vec<&'static Extension>,
}

impl RegistryBuilder {
    pub fn new(variant: Variant) -> Self {
        RegistryBuilder {
            variant,
            extensions: Vec::new(),
        }
    }

    pub fn extension(mut self, extension: &'static Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut registry = Registry {
            variant: self.variant,
            extensions: Vec::new(),
            groups: BTreeMap::new(),
            commands: BTreeMap::new(),
            events: BTreeMap::new(),
        };

        for extension in self.extensions.iter() {
            registry.merge(extension)?;
        }

        log::debug!(
            "built {:?} registry from {:?}: {} commands, {} events",
            registry.variant,
            registry.extensions,
            registry.commands.len(),
            registry.events.values().map(|e| 1 + e.sub_events.len()).sum::<usize>()
        );

        Ok(registry)
    }
}

/// The merged command and event tables for one hardware variant
#[derive(Debug)]
pub struct Registry {
    variant: Variant,
    extensions: Vec<&'static str>,
    groups: BTreeMap<u16, &'static str>,
    commands: BTreeMap<u16, ResolvedCommand>,
    events: BTreeMap<u8, EventEntry>,
}

lazy_static::lazy_static! {
    static ref IDB05A1: Arc<Registry> = Arc::new(
        RegistryBuilder::new(Variant::Idb05a1)
            .extension(&base::BASE)
            .extension(&vendor::BLUENRG_MS)
            .build()
            .expect("the IDB05A1 tables are consistent")
    );

    static ref IDB04A1: Arc<Registry> = Arc::new(
        RegistryBuilder::new(Variant::Idb04a1)
            .extension(&base::BASE)
            .extension(&vendor::BLUENRG_MS)
            .build()
            .expect("the IDB04A1 tables are consistent")
    );
}

impl Registry {
    /// The standard HCI tables merged with the BlueNRG-MS tables
    ///
    /// The registries are built once and shared.
    pub fn bluenrg_ms(variant: Variant) -> Arc<Registry> {
        match variant {
            Variant::Idb05a1 => IDB05A1.clone(),
            Variant::Idb04a1 => IDB04A1.clone(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn merge(&mut self, extension: &'static Extension) -> Result<(), SchemaError> {
        for group in extension.groups {
            match self.groups.get(&group.ogf) {
                Some(name) if *name != group.name => {
                    return Err(SchemaError::DuplicateGroup(group.ogf));
                }
                _ => {
                    self.groups.insert(group.ogf, group.name);
                }
            }

            for command in group.commands {
                let opcode = OpCode::new(group.ogf, command.ocf);

                if self.commands.contains_key(&opcode.to_val()) {
                    return Err(SchemaError::DuplicateCommand(opcode));
                }

                let response = command.response.resolve(self.variant, command.name)?;

                let resolved = ResolvedCommand {
                    opcode,
                    group: group.name,
                    name: command.name,
                    request: command.request.resolve(self.variant, command.name)?,
                    response,
                    completion: command.completion,
                    response_has_status: response.layout().map(|l| l.leads_with_status()).unwrap_or_default(),
                };

                self.commands.insert(opcode.to_val(), resolved);
            }
        }

        for event in extension.events {
            let code = event.code as u8;

            if self.events.contains_key(&code) {
                return Err(SchemaError::DuplicateEvent(event.code));
            }

            let entry = EventEntry {
                event: ResolvedEvent {
                    code: event.code,
                    name: event.name,
                    params: event.params.resolve(self.variant, event.name)?,
                },
                sub_code: event.sub_code,
                sub_events: BTreeMap::new(),
            };

            self.events.insert(code, entry);
        }

        for table in extension.sub_events {
            let variant = self.variant;

            let parent = self
                .events
                .get_mut(&table.parent)
                .filter(|entry| entry.sub_code.is_some())
                .ok_or(SchemaError::NoParentEvent(table.parent))?;

            for event in table.events {
                if parent.sub_events.contains_key(&event.code) {
                    return Err(SchemaError::DuplicateSubEvent(table.parent, event.code));
                }

                let resolved = ResolvedEvent {
                    code: event.code,
                    name: event.name,
                    params: event.params.resolve(variant, event.name)?,
                };

                parent.sub_events.insert(event.code, resolved);
            }
        }

        self.extensions.push(extension.name);

        Ok(())
    }

    /// Look up a command
    pub fn command(&self, opcode: OpCode) -> Result<&ResolvedCommand, SchemaError> {
        if !self.groups.contains_key(&opcode.ogf()) {
            return Err(SchemaError::UnknownGroup(opcode.ogf()));
        }

        self.commands
            .get(&opcode.to_val())
            .ok_or(SchemaError::UnknownCommand(opcode))
    }

    /// Look up an event by its event code
    pub fn event(&self, code: u8) -> Result<&ResolvedEvent, SchemaError> {
        self.events
            .get(&code)
            .map(|entry| &entry.event)
            .ok_or(SchemaError::UnknownEvent(code))
    }

    /// Look up a sub event of a meta event
    pub fn sub_event(&self, code: u8, sub_code: u16) -> Result<&ResolvedEvent, SchemaError> {
        self.events
            .get(&code)
            .ok_or(SchemaError::UnknownEvent(code))?
            .sub_events
            .get(&sub_code)
            .ok_or(SchemaError::UnknownSubEvent(code, sub_code))
    }

    /// Get the width of the sub event code for an event code
    ///
    /// `None` is returned for events without sub events
    pub fn sub_code_width(&self, code: u8) -> Result<Option<SubCodeWidth>, SchemaError> {
        self.events
            .get(&code)
            .map(|entry| entry.sub_code)
            .ok_or(SchemaError::UnknownEvent(code))
    }

    /// Name of an opcode group
    pub fn group_name(&self, ogf: u16) -> Result<&'static str, SchemaError> {
        self.groups.get(&ogf).copied().ok_or(SchemaError::UnknownGroup(ogf))
    }

    pub fn commands(&self) -> impl Iterator<Item = &ResolvedCommand> {
        self.commands.values()
    }

    /// Iterate over every event and sub event
    ///
    /// The first item of the tuple is the event code, the sub events have the sub event code
    /// within the second item.
    pub fn events(&self) -> impl Iterator<Item = (u8, &ResolvedEvent, Option<&ResolvedEvent>)> {
        self.events.iter().flat_map(|(code, entry)| {
            core::iter::once((*code, &entry.event, None)).chain(
                entry
                    .sub_events
                    .values()
                    .map(move |sub| (*code, &entry.event, Some(sub))),
            )
        })
    }
}

/// A decoded field value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    U32(u32),
    Bytes(Vec<u8>),
}

macro_rules! value_from {
    ( $( $ty:ty => $var:ident ),* ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$var(v.into())
                }
            }
        )*
    };
}

value_from!(u8 => U8, i8 => I8, u16 => U16, u32 => U32, Vec<u8> => Bytes, &[u8] => Bytes, [u8; 6] => Bytes);

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::U8(v as u8)
    }
}

/// A checked reader of the fields of a layout
///
/// The reader borrows the parameter buffer, fields are read in place.
#[derive(Clone, Copy, Debug)]
pub struct LayoutReader<'a> {
    buf: &'a [u8],
}

impl<'a> LayoutReader<'a> {
    /// Create a reader for a layout
    ///
    /// The buffer must at least hold every fixed field of the layout
    pub fn new(layout: Layout, buf: &'a [u8]) -> Result<Self, CodecError> {
        let needed = layout.min_len();

        if buf.len() < needed {
            Err(CodecError::TooShort {
                needed,
                available: buf.len(),
            })
        } else {
            Ok(LayoutReader { buf })
        }
    }

    /// Create a reader without checking against a layout
    ///
    /// Every read is still bounds checked.
    pub fn unchecked(buf: &'a [u8]) -> Self {
        LayoutReader { buf }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    fn slice(&self, field: &Field) -> Result<&'a [u8], CodecError> {
        let end = field.end().unwrap_or(self.buf.len()).max(field.offset);

        self.buf.get(field.offset..end).ok_or(CodecError::TooShort {
            needed: end,
            available: self.buf.len(),
        })
    }

    fn expect(&self, field: &Field, width: Width) -> Result<&'a [u8], CodecError> {
        if field.width == width {
            self.slice(field)
        } else {
            Err(CodecError::WidthMismatch(field.name))
        }
    }

    pub fn u8(&self, field: &Field) -> Result<u8, CodecError> {
        self.expect(field, Width::U8).map(|b| b[0])
    }

    pub fn i8(&self, field: &Field) -> Result<i8, CodecError> {
        self.expect(field, Width::I8).map(|b| b[0] as i8)
    }

    pub fn u16(&self, field: &Field) -> Result<u16, CodecError> {
        self.expect(field, Width::U16)
            .map(|b| <u16>::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&self, field: &Field) -> Result<u32, CodecError> {
        self.expect(field, Width::U32)
            .map(|b| <u32>::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a byte array or a tail field
    pub fn bytes(&self, field: &Field) -> Result<&'a [u8], CodecError> {
        match field.width {
            Width::Bytes(_) | Width::Tail => self.slice(field),
            _ => Err(CodecError::WidthMismatch(field.name)),
        }
    }

    /// Read a six byte device address
    pub fn address(&self, field: &Field) -> Result<[u8; 6], CodecError> {
        let b = self.expect(field, Width::Bytes(6))?;

        Ok([b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    /// Read a field of any width as a [`Value`]
    pub fn value(&self, field: &Field) -> Result<Value, CodecError> {
        Ok(match field.width {
            Width::U8 => Value::U8(self.u8(field)?),
            Width::I8 => Value::I8(self.i8(field)?),
            Width::U16 => Value::U16(self.u16(field)?),
            Width::U32 => Value::U32(self.u32(field)?),
            Width::Bytes(_) | Width::Tail => Value::Bytes(self.bytes(field)?.to_vec()),
        })
    }
}

/// A writer of the fields of a layout
///
/// The buffer starts zero filled with the length of the fixed fields. Writing the tail field
/// extends the buffer.
#[derive(Clone, Debug)]
pub struct LayoutWriter {
    buf: Vec<u8>,
}

impl LayoutWriter {
    pub fn new(layout: Layout) -> Self {
        LayoutWriter {
            buf: vec![0; layout.min_len()],
        }
    }

    fn slot(&mut self, field: &Field, width: Width) -> Result<&mut [u8], CodecError> {
        if field.width != width {
            return Err(CodecError::WidthMismatch(field.name));
        }

        let end = field.end().unwrap_or(field.offset);

        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }

        Ok(&mut self.buf[field.offset..end])
    }

    pub fn u8(&mut self, field: &Field, val: u8) -> Result<&mut Self, CodecError> {
        self.slot(field, Width::U8)?[0] = val;
        Ok(self)
    }

    pub fn i8(&mut self, field: &Field, val: i8) -> Result<&mut Self, CodecError> {
        self.slot(field, Width::I8)?[0] = val as u8;
        Ok(self)
    }

    pub fn u16(&mut self, field: &Field, val: u16) -> Result<&mut Self, CodecError> {
        self.slot(field, Width::U16)?.copy_from_slice(&val.to_le_bytes());
        Ok(self)
    }

    pub fn u32(&mut self, field: &Field, val: u32) -> Result<&mut Self, CodecError> {
        self.slot(field, Width::U32)?.copy_from_slice(&val.to_le_bytes());
        Ok(self)
    }

    /// Write a byte array or a tail field
    ///
    /// Data shorter than a fixed array is zero padded, data longer than it is an error.
    pub fn bytes(&mut self, field: &Field, data: &[u8]) -> Result<&mut Self, CodecError> {
        match field.width {
            Width::Bytes(len) => {
                if data.len() > len {
                    return Err(CodecError::Oversize {
                        field: field.name,
                        max: len,
                        len: data.len(),
                    });
                }

                let slot = self.slot(field, Width::Bytes(len))?;

                slot[..data.len()].copy_from_slice(data);

                slot[data.len()..].iter_mut().for_each(|b| *b = 0);
            }
            Width::Tail => {
                self.buf.resize(field.offset.max(self.buf.len()), 0);

                self.buf.truncate(field.offset);

                self.buf.extend_from_slice(data);
            }
            _ => return Err(CodecError::WidthMismatch(field.name)),
        }

        Ok(self)
    }

    pub fn set_value(&mut self, field: &Field, value: &Value) -> Result<&mut Self, CodecError> {
        match value {
            Value::U8(v) => self.u8(field, *v),
            Value::I8(v) => self.i8(field, *v),
            Value::U16(v) => self.u16(field, *v),
            Value::U32(v) => self.u32(field, *v),
            Value::Bytes(v) => self.bytes(field, v),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Errors of the schema registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaError {
    UnknownGroup(u16),
    UnknownCommand(OpCode),
    UnknownEvent(u8),
    UnknownSubEvent(u8, u16),
    DuplicateGroup(u16),
    DuplicateCommand(OpCode),
    DuplicateEvent(u16),
    DuplicateSubEvent(u8, u16),
    /// Sub events were given for an event that is not registered or has no sub events
    NoParentEvent(u8),
    NoLayoutForVariant(&'static str, Variant),
}

impl core::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            SchemaError::UnknownGroup(ogf) => write!(f, "unregistered opcode group 0x{:02X}", ogf),
            SchemaError::UnknownCommand(op) => write!(f, "unregistered command {:?}", op),
            SchemaError::UnknownEvent(code) => write!(f, "unregistered event 0x{:02X}", code),
            SchemaError::UnknownSubEvent(code, sub) => {
                write!(f, "unregistered sub event 0x{:04X} of event 0x{:02X}", sub, code)
            }
            SchemaError::DuplicateGroup(ogf) => {
                write!(f, "opcode group 0x{:02X} registered under two names", ogf)
            }
            SchemaError::DuplicateCommand(op) => write!(f, "command {:?} registered twice", op),
            SchemaError::DuplicateEvent(code) => write!(f, "event 0x{:02X} registered twice", code),
            SchemaError::DuplicateSubEvent(code, sub) => write!(
                f,
                "sub event 0x{:04X} of event 0x{:02X} registered twice",
                sub, code
            ),
            SchemaError::NoParentEvent(code) => {
                write!(f, "event 0x{:02X} cannot take sub events", code)
            }
            SchemaError::NoLayoutForVariant(name, variant) => {
                write!(f, "{} has no layout for {:?}", name, variant)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Errors from encoding or decoding raw packets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecError {
    TooShort { needed: usize, available: usize },
    /// A field was accessed with the wrong width
    WidthMismatch(&'static str),
    /// Data is larger than the maximum size of its field
    Oversize {
        field: &'static str,
        max: usize,
        len: usize,
    },
    MissingValue(&'static str),
    UnexpectedIndicator(u8),
    LengthMismatch { declared: usize, actual: usize },
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            CodecError::TooShort { needed, available } => write!(
                f,
                "buffer too short, {} bytes needed but only {} available",
                needed, available
            ),
            CodecError::WidthMismatch(field) => write!(f, "field '{}' accessed with the wrong width", field),
            CodecError::Oversize { field, max, len } => {
                write!(f, "{} bytes do not fit in field '{}' (max {})", len, field, max)
            }
            CodecError::MissingValue(field) => write!(f, "no value for field '{}'", field),
            CodecError::UnexpectedIndicator(tag) => write!(f, "unexpected packet indicator 0x{:02X}", tag),
            CodecError::LengthMismatch { declared, actual } => write!(
                f,
                "declared length {} does not match the actual length {}",
                declared, actual
            ),
        }
    }
}

impl std::error::Error for CodecError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn all_layouts(registry: &Registry) -> Vec<(String, Layout)> {
        let mut layouts = Vec::new();

        for command in registry.commands() {
            for (kind, params) in [("request", command.request), ("response", command.response)].iter() {
                if let Params::Fixed(layout) = params {
                    layouts.push((format!("{} {}", command.name, kind), *layout));
                }
            }
        }

        for (_, event, sub) in registry.events() {
            let event = sub.unwrap_or(event);

            if let Params::Fixed(layout) = event.params {
                layouts.push((event.name.to_string(), layout));
            }
        }

        layouts
    }

    fn random_value<R: Rng>(rng: &mut R, width: Width) -> Value {
        match width {
            Width::U8 => Value::U8(rng.gen()),
            Width::I8 => Value::I8(rng.gen()),
            Width::U16 => Value::U16(rng.gen()),
            Width::U32 => Value::U32(rng.gen()),
            Width::Bytes(len) => Value::Bytes((0..len).map(|_| rng.gen()).collect()),
            Width::Tail => {
                let len = rng.gen_range(0, 20);

                Value::Bytes((0..len).map(|_| rng.gen()).collect())
            }
        }
    }

    #[test]
    fn registries_build() {
        for variant in [Variant::Idb05a1, Variant::Idb04a1].iter() {
            let registry = Registry::bluenrg_ms(*variant);

            assert_eq!(registry.variant(), *variant);
            assert!(registry.commands().count() > 130);
        }
    }

    #[test]
    fn layouts_are_well_formed() {
        for variant in [Variant::Idb05a1, Variant::Idb04a1].iter() {
            for (name, layout) in all_layouts(&Registry::bluenrg_ms(*variant)) {
                let mut end = 0;

                for (index, field) in layout.fields().iter().enumerate() {
                    assert_eq!(field.offset, end, "gap or overlap at '{}' of {}", field.name, name);

                    match field.end() {
                        Some(next) => end = next,
                        None => assert_eq!(index + 1, layout.fields().len(), "tail of {} is not last", name),
                    }
                }
            }
        }
    }

    #[test]
    fn randomized_round_trip() {
        let mut rng = rand::thread_rng();

        for variant in [Variant::Idb05a1, Variant::Idb04a1].iter() {
            for (name, layout) in all_layouts(&Registry::bluenrg_ms(*variant)) {
                for _ in 0..20 {
                    let values: Vec<Value> = layout.fields().iter().map(|f| random_value(&mut rng, f.width)).collect();

                    let raw = layout.encode(&values).unwrap();

                    if let Some(len) = layout.fixed_len() {
                        assert_eq!(raw.len(), len, "{}", name);
                    }

                    assert_eq!(layout.decode(&raw).unwrap(), values, "{}", name);
                }
            }
        }
    }

    /// Random parameters, with the values encoded when there is a layout
    fn random_parameters<R: Rng>(rng: &mut R, params: Params) -> (Vec<u8>, Option<Vec<Value>>) {
        match params {
            Params::None => (Vec::new(), Some(Vec::new())),
            Params::Fixed(layout) => {
                let values: Vec<Value> = layout.fields().iter().map(|f| random_value(rng, f.width)).collect();

                (layout.encode(&values).unwrap(), Some(values))
            }
            Params::Variable | Params::ByVariant(_) => {
                let len = rng.gen_range(0, 40);

                ((0..len).map(|_| rng.gen()).collect(), None)
            }
        }
    }

    #[test]
    fn randomized_command_packets() {
        use crate::hci::{CommandPacket, COMMAND_HEADER_SIZE, HCI_MAX_PAYLOAD_SIZE};

        let mut rng = rand::thread_rng();

        let mut variable = 0;

        for variant in [Variant::Idb05a1, Variant::Idb04a1].iter() {
            let registry = Registry::bluenrg_ms(*variant);

            for command in registry.commands() {
                if let Params::ByVariant(_) = command.request {
                    panic!("{} is not resolved for {:?}", command.name, variant);
                }

                if command.request == Params::Variable {
                    variable += 1;
                }

                for _ in 0..10 {
                    let (raw, values) = random_parameters(&mut rng, command.request);

                    if raw.len() > HCI_MAX_PAYLOAD_SIZE - COMMAND_HEADER_SIZE {
                        continue;
                    }

                    let packet = CommandPacket::new(command.opcode, raw).unwrap();

                    let parsed = CommandPacket::from_packet(&packet.clone().into_packet()).unwrap();

                    assert_eq!(parsed, packet, "{}", command.name);
                    assert_eq!(registry.command(parsed.opcode()).unwrap().name, command.name);

                    if let (Some(layout), Some(values)) = (command.request.layout(), values) {
                        assert_eq!(layout.decode(parsed.parameters()).unwrap(), values, "{}", command.name);
                    }
                }
            }
        }

        assert!(variable > 0);
    }

    #[test]
    fn randomized_event_frames() {
        use crate::hci::events::EventPacket;

        let mut rng = rand::thread_rng();

        for variant in [Variant::Idb05a1, Variant::Idb04a1].iter() {
            let registry = Registry::bluenrg_ms(*variant);

            for (code, event, sub) in registry.events() {
                let width = registry.sub_code_width(code).unwrap();

                // meta events only come with one of their sub events
                if width.is_some() != sub.is_some() {
                    continue;
                }

                let expected = sub.unwrap_or(event);

                for _ in 0..10 {
                    let (raw, values) = random_parameters(&mut rng, expected.params);

                    let mut parameters = Vec::new();

                    match width {
                        Some(SubCodeWidth::U8) => parameters.push(expected.code as u8),
                        Some(SubCodeWidth::U16) => parameters.extend_from_slice(&expected.code.to_le_bytes()),
                        None => (),
                    }

                    parameters.extend_from_slice(&raw);

                    if parameters.len() > u8::MAX as usize {
                        continue;
                    }

                    let mut frame = vec![0x04, code, parameters.len() as u8];

                    frame.extend_from_slice(&parameters);

                    assert!(crate::hci::verify(Some(&frame)), "{}", expected.name);

                    let decoded = EventPacket::from_packet(&frame).unwrap().decode(&registry).unwrap();

                    assert_eq!(decoded.code, code);
                    assert_eq!(decoded.name(), expected.name);
                    assert_eq!(decoded.sub_code, sub.map(|s| s.code));
                    assert_eq!(decoded.parameters, &raw[..], "{}", expected.name);

                    if let (Some(layout), Some(values)) = (decoded.layout(), values) {
                        assert_eq!(layout.decode(decoded.parameters).unwrap(), values, "{}", expected.name);
                    }
                }
            }
        }
    }

    #[test]
    fn unregistered_lookups_fail() {
        let registry = Registry::bluenrg_ms(Variant::Idb05a1);

        assert_eq!(
            registry.command(OpCode::new(0x02, 0x01)).unwrap_err(),
            SchemaError::UnknownGroup(0x02)
        );
        assert_eq!(
            registry.command(OpCode::new(0x08, 0x3FF)).unwrap_err(),
            SchemaError::UnknownCommand(OpCode::new(0x08, 0x3FF))
        );
        assert_eq!(registry.event(0x99).unwrap_err(), SchemaError::UnknownEvent(0x99));
        assert_eq!(
            registry.sub_event(0xFF, 0x7777).unwrap_err(),
            SchemaError::UnknownSubEvent(0xFF, 0x7777)
        );
    }

    #[test]
    fn variant_overrides() {
        let init = OpCode::new(vendor::OGF_VENDOR, vendor::gap::INIT);

        let new_stack = Registry::bluenrg_ms(Variant::Idb05a1);
        let old_stack = Registry::bluenrg_ms(Variant::Idb04a1);

        let new_len = new_stack.command(init).unwrap().request.layout().unwrap().min_len();
        let old_len = old_stack.command(init).unwrap().request.layout().unwrap().min_len();

        assert_eq!(new_len, 3);
        assert_eq!(old_len, 1);

        let modified = old_stack.sub_event(0xFF, vendor::events::GATT_ATTRIBUTE_MODIFIED).unwrap();

        assert!(modified.params.layout().unwrap().field("offset").is_none());
    }

    static DUPLICATE: Extension = Extension {
        name: "duplicate",
        groups: &[GroupDescriptor {
            ogf: 0x01,
            name: "LINK_CTL",
            commands: &[CommandDescriptor::new(0x06, "DISCONNECT", Params::None, Params::None)],
        }],
        events: &[],
        sub_events: &[],
    };

    static ORPHAN: Extension = Extension {
        name: "orphan",
        groups: &[],
        events: &[],
        sub_events: &[SubEvents {
            parent: 0x05,
            events: &[EventDescriptor::new(0x01, "ORPHAN", Params::None)],
        }],
    };

    #[test]
    fn merge_errors() {
        let dup = RegistryBuilder::new(Variant::Idb05a1)
            .extension(&base::BASE)
            .extension(&DUPLICATE)
            .build();

        assert_eq!(dup.unwrap_err(), SchemaError::DuplicateCommand(OpCode::new(0x01, 0x06)));

        let orphan = RegistryBuilder::new(Variant::Idb05a1)
            .extension(&base::BASE)
            .extension(&ORPHAN)
            .build();

        assert_eq!(orphan.unwrap_err(), SchemaError::NoParentEvent(0x05));

        // vendor sub events need the vendor event of the base tables
        let vendor_only = RegistryBuilder::new(Variant::Idb05a1)
            .extension(&vendor::BLUENRG_MS)
            .build();

        assert_eq!(vendor_only.unwrap_err(), SchemaError::NoParentEvent(0xFF));
    }

    #[test]
    fn writer_rejects_oversize() {
        const FIELDS: &[Field] = &[Field::u8("length", 0), Field::bytes("data", 1, 31)];
        let layout = Layout(FIELDS);

        let mut writer = LayoutWriter::new(layout);

        assert_eq!(
            writer.bytes(&layout.0[1], &[0u8; 32]).unwrap_err(),
            CodecError::Oversize {
                field: "data",
                max: 31,
                len: 32
            }
        );

        writer.u8(&layout.0[0], 3).unwrap().bytes(&layout.0[1], &[1, 2, 3]).unwrap();

        let raw = writer.finish();

        assert_eq!(raw.len(), 32);
        assert_eq!(&raw[..4], &[3, 1, 2, 3]);
    }

    #[test]
    fn reader_checks_width() {
        let field = Field::u16("handle", 0);

        let reader = LayoutReader::unchecked(&[0x01, 0x02]);

        assert_eq!(reader.u16(&field), Ok(0x0201));
        assert_eq!(reader.u8(&field), Err(CodecError::WidthMismatch("handle")));
        assert!(LayoutReader::unchecked(&[0x01]).u16(&field).is_err());
    }
}
