use log::error;

use crate::errors::Fault;

/// A rendered description of a fault: its kind plus the offending
/// context (address, operands, operator). The exact text is not part
/// of the machine's contract, only these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} fault: {}", self.kind, self.message)
    }
}

/// Classifies and surfaces a fault.
///
/// The processor calls this exactly once per faulted run, then halts;
/// faults are never swallowed or retried.
pub fn report(fault: &Fault) -> Diagnostic {
    let diagnostic = Diagnostic {
        kind: fault.kind(),
        message: fault.to_string(),
    };

    error!("{}", diagnostic);

    diagnostic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MemoryFault;

    #[test]
    fn test_report_carries_kind_and_context() {
        let fault = Fault::from(MemoryFault::OutOfBounds { address: 2048 });

        let diagnostic = report(&fault);
        assert_eq!(diagnostic.kind, "memory");
        assert!(diagnostic.message.contains("2048"));
        assert_eq!(
            diagnostic.to_string(),
            "memory fault: address `2048` is out of bounds"
        );
    }
}
