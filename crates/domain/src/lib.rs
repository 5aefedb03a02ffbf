pub mod build_state;
pub mod builder;
pub mod catalog;
pub mod combat;
pub mod derive;
pub mod error;
pub mod ids;
pub mod invalidation;
pub mod value_objects;

pub use error::DomainError;

// Re-export ID types
pub use ids::{
    AlignmentId, CharacterId, ClassDefinitionId, ClassId, EditionId, EquipmentId, RaceId,
    SettingId, SpellId,
};

// Re-export the rules catalog
pub use catalog::{
    BucketMap, CatalogData, CatalogError, CharacterClass, Edition, Equipment,
    EquipmentEditionResolver, Race, RulesCatalog, SameEditionBucket, Spell,
};

// Re-export builder state and the state machine
pub use build_state::{
    BuildField, BuildState, CharacterType, ClassEntry, Currency, EditMode, EquipmentSelection,
    EquipmentSlot, LockedSelections, StepId, Wealth,
};
pub use builder::{
    BuilderMode, BuilderOverrides, ChangeOutcome, CharacterBuilder, CompletedCharacter,
    PendingChange,
};

// Re-export the invalidation engine
pub use invalidation::{
    detect_invalidations, resolve_invalidations, InvalidationGroup, InvalidationResult,
    InvalidationRule, RuleContext, RuleSet, StepInvalidation,
};

pub use combat::{
    calculate_armor_class, calculate_attack_bonus, get_active_armor_config,
    get_armor_configurations, ArmorClass, ArmorClassInput, ArmorConfiguration, AttackBonus,
};

pub use value_objects::{Ability, CharacterName, WealthFormula, WealthFormulaError};
