#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    Empty,
    TooMany { len: usize },
    Negative { index: usize, value: i128 },
    TooLarge { index: usize, value: i128, max: u32 },
    ZeroSum,
    SumOverflow,
}

impl std::fmt::Display for WeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightError::Empty => write!(f, "weights slice is empty"),
            WeightError::TooMany { len } => {
                write!(f, "too many weights to index with u32: {len}")
            }
            WeightError::Negative { index, value } => {
                write!(
                    f,
                    "weights contain a negative value at index {index}: {value}"
                )
            }
            WeightError::TooLarge { index, value, max } => {
                write!(
                    f,
                    "weight at index {index} is {value}, larger than the maximum {max}"
                )
            }
            WeightError::ZeroSum => write!(f, "sum of weights is zero"),
            WeightError::SumOverflow => write!(f, "sum of weights does not fit in u32"),
        }
    }
}

impl std::error::Error for WeightError {}
