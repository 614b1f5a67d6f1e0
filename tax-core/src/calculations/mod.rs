//! Tax calculation modules.
//!
//! Leaves first: the numeric helpers in [`common`], bracket arithmetic,
//! worksheets, then the income, deduction, surtax, form and credit passes
//! the engine sequences.

pub mod brackets;
pub mod common;
pub mod credits;
pub mod deductions;
pub mod forms;
pub mod income;
pub mod surtaxes;
pub mod worksheets;

pub use worksheets::{
    SeWorksheet, SeWorksheetConfig, SeWorksheetError, SeWorksheetInput, SeWorksheetResult,
    UnderpaymentWorksheet, UnderpaymentWorksheetConfig, UnderpaymentWorksheetError,
    UnderpaymentWorksheetInput, UnderpaymentWorksheetResult,
};
