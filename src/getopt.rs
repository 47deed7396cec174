//! Minimal getopt(3)-style scanner.
//!
//! Arguments are scanned strictly left to right. Parsing stops at the first
//! token that does not look like an option; arguments are never permuted.

use crate::error::UsageError;

/// A recognised option and its value, if the option takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    pub flag: char,
    pub value: Option<String>,
}

pub struct GetOpt<'a> {
    args: &'a [String],
    optstring: &'a str,
    optind: usize,
    failed: bool,
}

impl<'a> GetOpt<'a> {
    /// `optstring` lists the accepted flags; a flag followed by `:` takes a value.
    pub fn new(args: &'a [String], optstring: &'a str) -> Self {
        Self {
            args,
            optstring,
            optind: 0,
            failed: false,
        }
    }

    /// Index of the first argument not consumed by option parsing.
    pub fn optind(&self) -> usize {
        self.optind
    }

    pub fn remaining(&self) -> &'a [String] {
        &self.args[self.optind.min(self.args.len())..]
    }

    /// Whether the scan stopped on malformed input rather than running out of options.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Returns `Some(takes_value)` if `flag` is accepted.
    fn lookup(&self, flag: char) -> Option<bool> {
        if flag == ':' {
            return None;
        }
        let pos = self.optstring.find(flag)?;
        Some(self.optstring[pos + flag.len_utf8()..].starts_with(':'))
    }

    fn fail(&mut self, err: UsageError) -> Option<Result<Opt, UsageError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl Iterator for GetOpt<'_> {
    type Item = Result<Opt, UsageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.args.get(self.optind)?;
        let mut chars = token.chars();
        if chars.next() != Some('-') {
            return None;
        }
        let flag = chars.next()?;
        if flag == '-' && chars.as_str().is_empty() {
            self.optind += 1;
            return None;
        }
        let Some(takes_value) = self.lookup(flag) else {
            return self.fail(UsageError::UnknownOption(token.clone()));
        };
        self.optind += 1;

        let value = if !takes_value {
            None
        } else if !chars.as_str().is_empty() {
            Some(chars.as_str().to_owned())
        } else if let Some(next) = self.args.get(self.optind) {
            self.optind += 1;
            Some(next.clone())
        } else {
            return self.fail(UsageError::MissingValue(token.clone()));
        };

        Some(Ok(Opt { flag, value }))
    }
}
