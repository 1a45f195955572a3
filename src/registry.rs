//! Lookup tables mapping pattern ids to named evaluators.
//!
//! Registries are built once at startup and handed to the renderer, which
//! only reads from them afterwards. Evaluators are borrowed, so built-in
//! patterns (which live in statics) and user patterns (owned by the caller)
//! can sit side by side without allocation.

use crate::colors::Palette;
use crate::naming::{DisplayName, NameTooLong, display_name, title_case};
use crate::primary::{BuiltinPrimary, PrimaryPattern};
use crate::secondary::{BuiltinSecondary, NoModulation, SecondaryPattern};
use crate::types::{Color, Modulation, PatternError, PatternOutput, PatternState, Sample};
use heapless::Vec;
use rand::RngCore;

/// Secondary id that always resolves to [`NoModulation`].
pub const NO_MODULATION_ID: u8 = 0;

static BUILTIN_PRIMARIES: [BuiltinPrimary; 8] = BuiltinPrimary::ALL;
static BUILTIN_SECONDARIES: [BuiltinSecondary; 7] = BuiltinSecondary::ALL;
static NO_MODULATION: NoModulation = NoModulation;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No pattern is registered under this id.
    NotFound(u8),

    /// Attempted to register a pattern with an id that already exists.
    DuplicateId(u8),

    /// The id is reserved and cannot be registered.
    ReservedId(u8),

    /// The registry is full and cannot accept more patterns.
    RegistryFull,

    /// The display name does not fit in a [`DisplayName`].
    NameTooLong,

    /// The looked-up pattern failed to evaluate.
    Pattern(PatternError),
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryError::NotFound(id) => write!(f, "no pattern registered with id {}", id),
            RegistryError::DuplicateId(id) => {
                write!(f, "a pattern with id {} is already registered", id)
            }
            RegistryError::ReservedId(id) => write!(f, "pattern id {} is reserved", id),
            RegistryError::RegistryFull => {
                write!(f, "registry is full, cannot add more patterns")
            }
            RegistryError::NameTooLong => write!(f, "pattern display name is too long"),
            RegistryError::Pattern(err) => write!(f, "pattern error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

impl From<PatternError> for RegistryError {
    fn from(err: PatternError) -> Self {
        RegistryError::Pattern(err)
    }
}

impl From<NameTooLong> for RegistryError {
    fn from(_: NameTooLong) -> Self {
        RegistryError::NameTooLong
    }
}

/// A registered pattern: its id, its display name and the evaluator itself.
pub struct PatternDescriptor<'a, E: ?Sized> {
    id: u8,
    display_name: DisplayName,
    evaluator: &'a E,
}

impl<'a, E: ?Sized> PatternDescriptor<'a, E> {
    /// Registry id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Name shown in the UI.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The pattern itself.
    pub fn evaluator(&self) -> &'a E {
        self.evaluator
    }
}

impl<E: ?Sized> Clone for PatternDescriptor<'_, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            display_name: self.display_name.clone(),
            evaluator: self.evaluator,
        }
    }
}

impl<E: ?Sized> core::fmt::Debug for PatternDescriptor<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatternDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name.as_str())
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity table of patterns kept sorted by id.
///
/// # Type Parameters
/// * `'a` - Lifetime of the borrowed evaluators
/// * `E` - Evaluator type, usually `dyn PrimaryPattern` or `dyn SecondaryPattern`
/// * `N` - Maximum number of patterns
pub struct Registry<'a, E: ?Sized, const N: usize> {
    entries: Vec<PatternDescriptor<'a, E>, N>,
}

/// Registry of primary patterns.
pub type PrimaryRegistry<'a, const N: usize> = Registry<'a, dyn PrimaryPattern + 'a, N>;

/// Primary registry with room for the built-ins and eight user patterns.
pub type PrimaryRegistry16<'a> = PrimaryRegistry<'a, 16>;

impl<'a, E: ?Sized, const N: usize> Registry<'a, E, N> {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers `evaluator` under `id`, deriving its display name from a
    /// snake_case `identifier`.
    ///
    /// # Errors
    /// * `DuplicateId` - `id` is already taken
    /// * `RegistryFull` - the registry holds `N` patterns already
    /// * `NameTooLong` - the derived name doesn't fit
    pub fn register(&mut self, id: u8, identifier: &str, evaluator: &'a E) -> Result<(), RegistryError> {
        let name = title_case(identifier)?;
        self.insert(id, name, evaluator)
    }

    /// Registers `evaluator` under `id` with an explicit display name.
    ///
    /// # Errors
    /// Same as [`Registry::register`].
    pub fn register_named(&mut self, id: u8, name: &str, evaluator: &'a E) -> Result<(), RegistryError> {
        let name = display_name(name)?;
        self.insert(id, name, evaluator)
    }

    fn insert(&mut self, id: u8, display_name: DisplayName, evaluator: &'a E) -> Result<(), RegistryError> {
        let position = match self.entries.binary_search_by_key(&id, |entry| entry.id) {
            Ok(_) => return Err(RegistryError::DuplicateId(id)),
            Err(position) => position,
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("registering pattern {=u8}: {=str}", id, display_name.as_str());

        let descriptor = PatternDescriptor {
            id,
            display_name,
            evaluator,
        };
        self.entries
            .insert(position, descriptor)
            .map_err(|_| RegistryError::RegistryFull)
    }

    /// Looks up the pattern registered under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` if nothing is registered under `id`.
    pub fn get(&self, id: u8) -> Result<&PatternDescriptor<'a, E>, RegistryError> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .map(|position| &self.entries[position])
            .map_err(|_| RegistryError::NotFound(id))
    }

    /// Returns true if a pattern is registered under `id`.
    pub fn contains(&self, id: u8) -> bool {
        self.get(id).is_ok()
    }

    /// Iterates over all patterns in ascending id order.
    pub fn iter(&self) -> core::slice::Iter<'_, PatternDescriptor<'a, E>> {
        self.entries.iter()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no pattern is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, E: ?Sized, const N: usize> Default for Registry<'a, E, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Registry<'a, dyn PrimaryPattern + 'a, N> {
    /// Creates a registry holding the built-in primary patterns at ids 0-7.
    ///
    /// # Errors
    /// Returns `RegistryFull` if `N` is smaller than 8.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for pattern in BUILTIN_PRIMARIES.iter() {
            registry.register_named(pattern.id(), pattern.display_name(), pattern)?;
        }
        Ok(registry)
    }

    /// Evaluates the primary pattern registered under `id`.
    ///
    /// # Errors
    /// * `NotFound` - no pattern under `id`
    /// * `Pattern` - the pattern itself failed (e.g. palette index)
    pub fn evaluate(
        &self,
        id: u8,
        sample: &Sample,
        prev_state: &PatternState,
        palette: &Palette,
    ) -> Result<PatternOutput, RegistryError> {
        let descriptor = self.get(id)?;
        descriptor
            .evaluator()
            .evaluate(sample, prev_state, palette)
            .map_err(RegistryError::from)
    }
}

/// Registry of secondary patterns.
///
/// Id [`NO_MODULATION_ID`] always holds the identity modulation, named
/// "None", and cannot be replaced.
pub struct SecondaryRegistry<'a, const N: usize> {
    inner: Registry<'a, dyn SecondaryPattern + 'a, N>,
}

/// Secondary registry with room for the built-ins and eight user patterns.
pub type SecondaryRegistry16<'a> = SecondaryRegistry<'a, 16>;

impl<'a, const N: usize> SecondaryRegistry<'a, N> {
    /// Creates a registry holding only the "None" modulation.
    ///
    /// # Errors
    /// Returns `RegistryFull` if `N` is 0.
    pub fn new() -> Result<Self, RegistryError> {
        let mut inner: Registry<'a, dyn SecondaryPattern + 'a, N> = Registry::new();
        inner.register_named(NO_MODULATION_ID, "None", &NO_MODULATION)?;
        Ok(Self { inner })
    }

    /// Creates a registry holding "None" and the built-in secondaries at ids 1-7.
    ///
    /// # Errors
    /// Returns `RegistryFull` if `N` is smaller than 8.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new()?;
        for pattern in BUILTIN_SECONDARIES.iter() {
            registry.register(pattern.id(), pattern.identifier(), pattern)?;
        }
        Ok(registry)
    }

    /// Registers `evaluator` under `id`, deriving its display name from
    /// `identifier`.
    ///
    /// # Errors
    /// * `ReservedId` - `id` is [`NO_MODULATION_ID`]
    /// * any error from [`Registry::register`]
    pub fn register(
        &mut self,
        id: u8,
        identifier: &str,
        evaluator: &'a (dyn SecondaryPattern + 'a),
    ) -> Result<(), RegistryError> {
        if id == NO_MODULATION_ID {
            return Err(RegistryError::ReservedId(id));
        }
        self.inner.register(id, identifier, evaluator)
    }

    /// Registers `evaluator` under `id` with an explicit display name.
    ///
    /// # Errors
    /// Same as [`SecondaryRegistry::register`].
    pub fn register_named(
        &mut self,
        id: u8,
        name: &str,
        evaluator: &'a (dyn SecondaryPattern + 'a),
    ) -> Result<(), RegistryError> {
        if id == NO_MODULATION_ID {
            return Err(RegistryError::ReservedId(id));
        }
        self.inner.register_named(id, name, evaluator)
    }

    /// Looks up the pattern registered under `id`.
    pub fn get(
        &self,
        id: u8,
    ) -> Result<&PatternDescriptor<'a, dyn SecondaryPattern + 'a>, RegistryError> {
        self.inner.get(id)
    }

    /// Returns true if a pattern is registered under `id`.
    pub fn contains(&self, id: u8) -> bool {
        self.inner.contains(id)
    }

    /// Iterates over all patterns in ascending id order, starting with "None".
    pub fn iter(&self) -> core::slice::Iter<'_, PatternDescriptor<'a, dyn SecondaryPattern + 'a>> {
        self.inner.iter()
    }

    /// Number of registered patterns, including "None".
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Always false: "None" is registered on construction.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Evaluates the secondary pattern registered under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` if nothing is registered under `id`.
    pub fn evaluate(
        &self,
        id: u8,
        sample: &Sample,
        prev_state: &PatternState,
        in_color: Color,
        rng: &mut dyn RngCore,
    ) -> Result<Modulation, RegistryError> {
        let descriptor = self.get(id)?;
        Ok(descriptor.evaluator().evaluate(sample, prev_state, in_color, rng))
    }
}
