use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use super::cnf::{Clause, Lit, Problem};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing header, expected: p cnf|wcnf <vars> <clauses>")]
    MissingHeader,
    #[error("invalid header on line {line}, expected: p cnf|wcnf <vars> <clauses>")]
    InvalidHeader { line: usize },
    #[error("invalid integer '{token}' on line {line}")]
    InvalidInteger { line: usize, token: String },
    #[error("invalid weight on line {line}: must be a positive integer")]
    InvalidWeight { line: usize },
    #[error("clause on line {line} is not terminated by 0")]
    MissingTerminator { line: usize },
    #[error("literal 0 inside clause on line {line}")]
    ZeroLiteral { line: usize },
    #[error("literal {lit} on line {line} is out of range for {num_vars} vars")]
    LiteralOutOfRange { line: usize, lit: i64, num_vars: u32 },
    #[error("expected {expected} clauses, found {found}")]
    MissingClauses { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Cnf,
    Wcnf,
}

pub fn load_dimacs<P: AsRef<Path>>(path: P) -> Result<Problem, ParseError> {
    let file = File::open(path)?;
    parse_dimacs_reader(BufReader::new(file))
}

pub fn parse_dimacs_str(s: &str) -> Result<Problem, ParseError> {
    parse_dimacs_reader(std::io::Cursor::new(s.as_bytes()))
}

pub fn parse_dimacs_reader<R: BufRead>(r: R) -> Result<Problem, ParseError> {
    let mut lines = r
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)));

    let mut header = None;
    for item in lines.by_ref() {
        let (line_no, line) = item?;
        if !is_skippable(&line) {
            header = Some((line_no, line));
            break;
        }
    }
    let (header_no, header_line) = header.ok_or(ParseError::MissingHeader)?;
    let (format, num_vars, expected) = parse_header(&header_line, header_no)?;

    let mut problem = Problem::new(num_vars);
    // the declared count is untrusted until the clauses are read
    let hint = expected.min(1 << 16);
    problem.clauses.reserve(hint);
    problem.weights.reserve(hint);

    for item in lines {
        if problem.num_clauses() == expected {
            break;
        }
        let (line_no, line) = item?;
        if is_skippable(&line) {
            continue;
        }
        let (weight, clause) = parse_clause_line(&line, line_no, format, num_vars)?;
        problem.add_weighted_clause(weight, clause);
    }

    if problem.num_clauses() < expected {
        return Err(ParseError::MissingClauses {
            expected,
            found: problem.num_clauses(),
        });
    }
    Ok(problem)
}

fn is_skippable(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty() || t.starts_with('c')
}

fn parse_header(line: &str, line_no: usize) -> Result<(Format, u32, usize), ParseError> {
    let parts = line.split_whitespace().collect::<Vec<_>>();
    if parts.len() != 4 || parts[0] != "p" {
        return Err(ParseError::InvalidHeader { line: line_no });
    }
    let format = match parts[1] {
        "cnf" => Format::Cnf,
        "wcnf" => Format::Wcnf,
        _ => return Err(ParseError::InvalidHeader { line: line_no }),
    };
    let num_vars = parts[2]
        .parse::<u32>()
        .map_err(|_| invalid_integer(parts[2], line_no))?;
    let num_clauses = parts[3]
        .parse::<usize>()
        .map_err(|_| invalid_integer(parts[3], line_no))?;
    Ok((format, num_vars, num_clauses))
}

fn parse_clause_line(
    line: &str,
    line_no: usize,
    format: Format,
    num_vars: u32,
) -> Result<(u64, Clause), ParseError> {
    let mut values = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| invalid_integer(tok, line_no))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let weight = match format {
        Format::Cnf => 1,
        Format::Wcnf => {
            if values.is_empty() {
                return Err(ParseError::InvalidWeight { line: line_no });
            }
            let w = values.remove(0);
            if w <= 0 {
                return Err(ParseError::InvalidWeight { line: line_no });
            }
            w as u64
        }
    };

    if values.pop() != Some(0) {
        return Err(ParseError::MissingTerminator { line: line_no });
    }

    let mut clause = Clause::with_capacity(values.len());
    for value in values {
        if value.unsigned_abs() > u64::from(num_vars) {
            return Err(ParseError::LiteralOutOfRange {
                line: line_no,
                lit: value,
                num_vars,
            });
        }
        let lit = Lit::from_dimacs(value).ok_or(ParseError::ZeroLiteral { line: line_no })?;
        clause.push(lit);
    }
    Ok((weight, clause))
}

fn invalid_integer(token: &str, line_no: usize) -> ParseError {
    ParseError::InvalidInteger {
        line: line_no,
        token: token.to_string(),
    }
}

/// Writes `p cnf` when every weight is 1, otherwise `p wcnf` with leading weights.
pub fn to_dimacs(problem: &Problem) -> String {
    let weighted = problem.is_weighted();
    let mut out = String::new();
    let kind = if weighted { "wcnf" } else { "cnf" };
    out.push_str(&format!(
        "p {} {} {}\n",
        kind,
        problem.num_vars,
        problem.num_clauses()
    ));
    for (clause, &weight) in problem.clauses.iter().zip(&problem.weights) {
        if weighted {
            out.push_str(&format!("{} ", weight));
        }
        for &lit in clause {
            out.push_str(&format!("{} ", lit.to_dimacs()));
        }
        out.push_str("0\n");
    }
    out
}
