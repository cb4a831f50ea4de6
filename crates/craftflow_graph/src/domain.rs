// SPDX-License-Identifier: MIT OR Apache-2.0
//! Domain graph of things and transformations.
//!
//! The domain graph is built once from a [`Dataset`] and is immutable
//! afterwards. Things, transformations and crafters live in arenas and refer
//! to each other by id, so the thing/transformation back references never
//! form ownership cycles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Index of a [`Thing`] in its [`DomainGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThingId(pub usize);

/// Index of a [`Transformation`] in its [`DomainGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformationId(pub usize);

/// Index of a [`Crafter`] in its [`DomainGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrafterId(pub usize);

/// An item or fluid
#[derive(Debug, Clone)]
pub struct Thing {
    /// Unique name
    pub name: String,
    /// Display image reference
    pub image: Option<String>,
    /// Transformations consuming this thing, in dataset order
    pub ingredient_of: Vec<TransformationId>,
    /// Transformations producing this thing, in dataset order
    pub product_of: Vec<TransformationId>,
}

/// A recipe turning ingredients into products
#[derive(Debug, Clone)]
pub struct Transformation {
    /// Unique name
    pub name: String,
    /// Display image reference
    pub image: Option<String>,
    /// Entities able to perform this transformation
    pub crafters: Vec<CrafterId>,
    /// Consumed things
    pub ingredients: Vec<ThingId>,
    /// Produced things
    pub products: Vec<ThingId>,
}

/// An entity that performs transformations (assembler, furnace, ...)
#[derive(Debug, Clone)]
pub struct Crafter {
    /// Unique name
    pub name: String,
    /// Display image reference
    pub image: Option<String>,
}

/// Serialized thing declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingDef {
    /// Unique name
    pub name: String,
    /// Display image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// Serialized crafter declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrafterDef {
    /// Unique name
    pub name: String,
    /// Display image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// Serialized transformation declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationDef {
    /// Unique name
    pub name: String,
    /// Display image reference
    #[serde(default)]
    pub image: Option<String>,
    /// Crafter names
    #[serde(default)]
    pub crafters: Vec<String>,
    /// Ingredient thing names
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Product thing names
    #[serde(default)]
    pub products: Vec<String>,
}

impl TransformationDef {
    /// Create a transformation with no ingredients or products
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            crafters: Vec::new(),
            ingredients: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Set the ingredients
    pub fn with_ingredients<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.ingredients = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the products
    pub fn with_products<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.products = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the crafters
    pub fn with_crafters<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.crafters = names.into_iter().map(Into::into).collect();
        self
    }
}

/// In-memory dataset as handed over by a data loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Transformation shown when the view is reset
    #[serde(default)]
    pub default_transformation: Option<String>,
    /// Declared things
    #[serde(default)]
    pub things: Vec<ThingDef>,
    /// Declared crafters
    #[serde(default)]
    pub crafters: Vec<CrafterDef>,
    /// Declared transformations
    #[serde(default)]
    pub transformations: Vec<TransformationDef>,
}

/// Immutable graph of things, transformations and crafters
#[derive(Debug, Clone, Default)]
pub struct DomainGraph {
    things: Vec<Thing>,
    transformations: Vec<Transformation>,
    crafters: Vec<Crafter>,
    thing_index: IndexMap<String, ThingId>,
    transformation_index: IndexMap<String, TransformationId>,
    crafter_index: IndexMap<String, CrafterId>,
    default_transformation: Option<TransformationId>,
}

impl DomainGraph {
    /// Build a domain graph, resolving all name references.
    ///
    /// Things referenced by a transformation without being declared are
    /// created on the fly with no image.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, DomainError> {
        let mut graph = Self::default();

        for def in dataset.things {
            if graph.thing_index.contains_key(&def.name) {
                return Err(DomainError::DuplicateThing(def.name));
            }
            graph.push_thing(def.name, def.image);
        }

        for def in dataset.crafters {
            if graph.crafter_index.contains_key(&def.name) {
                return Err(DomainError::DuplicateCrafter(def.name));
            }
            let id = CrafterId(graph.crafters.len());
            graph.crafter_index.insert(def.name.clone(), id);
            graph.crafters.push(Crafter {
                name: def.name,
                image: def.image,
            });
        }

        for def in dataset.transformations {
            if graph.transformation_index.contains_key(&def.name) {
                return Err(DomainError::DuplicateTransformation(def.name));
            }
            let id = TransformationId(graph.transformations.len());

            let crafters = def
                .crafters
                .iter()
                .map(|name| {
                    graph.crafter_index.get(name).copied().ok_or_else(|| {
                        DomainError::UnknownCrafter {
                            transformation: def.name.clone(),
                            crafter: name.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut ingredients = Vec::with_capacity(def.ingredients.len());
            for name in def.ingredients {
                let thing = graph.intern_thing(name);
                if !ingredients.contains(&thing) {
                    ingredients.push(thing);
                    graph.things[thing.0].ingredient_of.push(id);
                }
            }

            let mut products = Vec::with_capacity(def.products.len());
            for name in def.products {
                let thing = graph.intern_thing(name);
                if !products.contains(&thing) {
                    products.push(thing);
                    graph.things[thing.0].product_of.push(id);
                }
            }

            graph.transformation_index.insert(def.name.clone(), id);
            graph.transformations.push(Transformation {
                name: def.name,
                image: def.image,
                crafters,
                ingredients,
                products,
            });
        }

        graph.default_transformation = match dataset.default_transformation {
            Some(name) => Some(
                graph
                    .transformation_by_name(&name)
                    .ok_or(DomainError::UnknownTransformation(name))?,
            ),
            None => None,
        };

        Ok(graph)
    }

    fn push_thing(&mut self, name: String, image: Option<String>) -> ThingId {
        let id = ThingId(self.things.len());
        self.thing_index.insert(name.clone(), id);
        self.things.push(Thing {
            name,
            image,
            ingredient_of: Vec::new(),
            product_of: Vec::new(),
        });
        id
    }

    fn intern_thing(&mut self, name: String) -> ThingId {
        match self.thing_index.get(&name) {
            Some(&id) => id,
            None => self.push_thing(name, None),
        }
    }

    /// Get a thing by id
    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.things.get(id.0)
    }

    /// Get a transformation by id
    pub fn transformation(&self, id: TransformationId) -> Option<&Transformation> {
        self.transformations.get(id.0)
    }

    /// Get a crafter by id
    pub fn crafter(&self, id: CrafterId) -> Option<&Crafter> {
        self.crafters.get(id.0)
    }

    /// Look up a thing by name
    pub fn thing_by_name(&self, name: &str) -> Option<ThingId> {
        self.thing_index.get(name).copied()
    }

    /// Look up a transformation by name
    pub fn transformation_by_name(&self, name: &str) -> Option<TransformationId> {
        self.transformation_index.get(name).copied()
    }


    /// Number of things
    pub fn thing_count(&self) -> usize {
        self.things.len()
    }

    /// Number of transformations
    pub fn transformation_count(&self) -> usize {
        self.transformations.len()
    }

    /// Transformation to show on an empty view: the dataset's choice, or the
    /// first declared transformation
    pub fn default_transformation(&self) -> Option<TransformationId> {
        self.default_transformation
            .or_else(|| (!self.transformations.is_empty()).then_some(TransformationId(0)))
    }
}

/// Error when building a domain graph
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Two things share a name
    #[error("Duplicate thing: {0}")]
    DuplicateThing(String),

    /// Two crafters share a name
    #[error("Duplicate crafter: {0}")]
    DuplicateCrafter(String),

    /// Two transformations share a name
    #[error("Duplicate transformation: {0}")]
    DuplicateTransformation(String),

    /// A transformation names an undeclared crafter
    #[error("Transformation {transformation} uses unknown crafter {crafter}")]
    UnknownCrafter {
        /// Referencing transformation
        transformation: String,
        /// Missing crafter
        crafter: String,
    },

    /// A referenced transformation does not exist
    #[error("Unknown transformation: {0}")]
    UnknownTransformation(String),
}
