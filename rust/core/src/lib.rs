// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BudgetLink Core
//!
//! Links construction-budget line items (hierarchical codes such as `"2.1"`)
//! to the named elements of a 3D scene (`"2.1_.037"`) and drives their
//! highlighting in an external renderer.
//!
//! ## Overview
//!
//! - **Normalization**: trimmed, case-sensitive codes and element names
//! - **Pattern generation**: curated per-project pattern lists with a generic
//!   fallback
//! - **Correspondence index**: code -> element names, cached on a content
//!   fingerprint of its inputs
//! - **Resolution**: manual links, then the index, then generated patterns
//! - **Highlighting**: save-once/restore original materials through a
//!   [`SceneHandle`]
//! - **Manual links**: a confidence-scored [`LinkingConfig`] with
//!   validation and JSON/CSV exchange
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use budget_link_core::{BudgetItem, LinkingSession, RecordingScene, SceneElement};
//!
//! let items = vec![BudgetItem::new("2.1", "Vigas")];
//! let elements = vec![
//!     SceneElement::new("a", "2.1_"),
//!     SceneElement::new("b", "2.1_.001"),
//!     SceneElement::new("c", "2.2_.001"),
//! ];
//! let mut scene = RecordingScene::from_elements(&elements);
//! let mut session = LinkingSession::new(items, elements);
//!
//! session.toggle("2.1", &mut scene);
//! assert_eq!(session.highlighted(), ["2.1_", "2.1_.001"]);
//! ```

mod csv;
pub mod error;
pub mod highlight;
pub mod index;
pub mod links;
pub mod matcher;
pub mod material;
pub mod normalize;
pub mod patterns;
pub mod report;
pub mod resolver;
pub mod session;
pub mod suggest;
pub mod types;

pub use error::{Error, Result};
pub use highlight::{
    HighlightApplicator, HighlightChange, HighlightState, MaterialCommand, RecordingScene,
    SceneHandle,
};
pub use index::{fingerprint, CorrespondenceIndex, IndexCache};
pub use links::{
    export_config, import_config, import_csv, try_import_config, validate, BudgetItemRef,
    Element3D, ExportFormat, Imported, LinkType, LinkingConfig, LinkingSettings, ManualLink,
    ValidationReport,
};
pub use matcher::{MatchKind, Matcher, MatcherChain};
pub use material::{Color, HighlightStyle, MaterialSnapshot};
pub use normalize::{normalize_code, normalize_element_name};
pub use patterns::{generate_patterns, CuratedEntry, ElementType, PatternTable};
pub use report::LinkingReport;
pub use resolver::{resolve, MatchResolver, ResolutionSource, Selection};
pub use session::LinkingSession;
pub use suggest::{suggest_links, LinkSuggestion};
pub use types::{flatten_elements, BudgetItem, ElementId, SceneElement};
