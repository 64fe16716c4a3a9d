//! Client side of the item list view: the http wrapper for `/api/items` and the
//! controller that owns list, dialog and draft state.

pub mod api;
pub mod controller;
pub mod error;

pub use api::{HttpItemsApi, ItemsApi, DEFAULT_REQUEST_TIMEOUT};
pub use controller::{
    ControllerError, ControllerEvent, DeleteOutcome, DialogMode, DraftTarget, FormDraft,
    ItemListController, LoadOutcome, Operation, Phase, SubmitOutcome, ViewSnapshot,
};
pub use error::ItemsApiError;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod api_tests;
