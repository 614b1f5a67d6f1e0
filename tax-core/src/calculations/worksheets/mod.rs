//! Form worksheets and sub-engines with their own intermediate lines.
//!
//! Each worksheet is a pure function of its inputs plus the year
//! configuration; the engine folds their results into the aggregate.

pub mod amt;
pub mod capital_gains;
pub mod qbi;
pub mod self_emp;
pub mod social_security;
pub mod underpayment;

pub use amt::{AmtInput, AmtResult, alternative_minimum_tax};
pub use capital_gains::{CapitalGainResult, net_capital_gains};
pub use qbi::{QbiResult, qbi_deduction};
pub use self_emp::{
    SeWorksheet, SeWorksheetConfig, SeWorksheetError, SeWorksheetInput, SeWorksheetResult,
};
pub use social_security::{SocialSecurityTaxability, taxable_benefits};
pub use underpayment::{
    UnderpaymentWorksheet, UnderpaymentWorksheetConfig, UnderpaymentWorksheetError,
    UnderpaymentWorksheetInput, UnderpaymentWorksheetResult,
};
