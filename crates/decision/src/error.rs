use leadgate_rules::RuleError;

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("rules error: {0}")]
    Rules(#[from] RuleError),

    #[error("decision exceeded its {0}ms deadline")]
    DeadlineExceeded(u64),
}

pub type Result<T> = std::result::Result<T, DecisionError>;
