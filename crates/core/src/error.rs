use thiserror::Error;

use crate::bank::BankError;
use crate::model::{InvalidOption, ParseIdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Option(#[from] InvalidOption),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::model::{AnswerOption, QuestionId};

    fn parse_answer(id: &str, option: &str) -> Result<(QuestionId, AnswerOption), Error> {
        Ok((id.parse()?, option.parse()?))
    }

    #[test]
    fn domain_errors_convert_into_crate_error() {
        assert!(matches!(parse_answer("x", "A"), Err(Error::Id(_))));
        assert!(matches!(parse_answer("1", "E"), Err(Error::Option(_))));
        assert_eq!(
            parse_answer(" 7 ", "b").ok(),
            Some((QuestionId::new(7), AnswerOption::B))
        );

        let bank: Result<QuestionBank, Error> = QuestionBank::from_json("{}").map_err(Error::from);
        assert!(matches!(bank, Err(Error::Bank(_))));
    }
}
