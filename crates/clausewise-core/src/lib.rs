pub mod classification;
pub mod contract;
pub mod document;
pub mod error;

pub use classification::{Classification, ContractType, OTHER_LABEL};
pub use contract::{
    ContractRecord, ContractValue, Dates, Financial, GoverningLaw, KeyElements, NonStandardClause,
    Obligation, Parties, RiskAnalysis, Signatory, UnusualTerm,
};
pub use document::{
    DEFAULT_MAX_UPLOAD_BYTES, ExtractedText, InvalidInput, PDF_MEDIA_TYPE, RawDocument, UploadLimits,
};
pub use error::ErrorKind;
