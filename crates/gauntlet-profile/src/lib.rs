pub mod domain;
pub mod record;
pub mod signature;
pub mod value;

pub use domain::{CharClass, ValueDomain};
pub use record::{
    Counterexample, EdgeCase, ExpectedClass, FailureClass, GeneratedInput, Provenance,
    ReductionStep, TestCaseRecord,
};
pub use signature::{
    ErrorCondition, FunctionSignature, ParamRelation, ParameterProfile, RejectAction,
    Rejection, RelationOperand, UsageRole,
};
pub use value::{ArgTuple, Value};
