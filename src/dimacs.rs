/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Reading and writing problems in DIMACS min cost flow format.
//!
//! A DIMACS file must look as follows.
//!
//! 1. empty lines are allowed and ignored
//! 2. a line starting with `c` is a comment line and is ignored
//! 3. the first non-comment line must have the form `p min <n> <m>`,
//!    where `<n>` is an integer > 0 denoting the number of nodes and
//!    `<m>` an integer > 0 denoting the number of arcs.
//! 4. after the problem line there must follow node lines of the form
//!    `n <node> <balance>` where `<node>` is the node number between
//!    `1..n` and `<balance>` is node's supply (if positive) or demand
//!    (if negative). Nodes that have balance 0 do not need to be
//!    specified.
//! 5. after the node lines there must be exactly `m` arc lines `a <u>
//!    <v> <lb> <ub> <c>` denoting the source and sink nodes of an arc
//!    as well as the arcs lower bound `<lb>`, upper bound `<ub>` and
//!    cost `<c>`.
//!
//! Lower bounds must be zero. This module accepts loops and parallel
//! arcs although the "official" DIMACS format forbids them.
//!
//! Flow vector files are plain lists of numbers, one value per arc in
//! arc order, separated by whitespace or line breaks. Comment lines
//! starting with `c` are ignored.

use crate::network::MinCostFlow;
use num_traits::NumAssign;
use std::error;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::str::{FromStr, SplitWhitespace};

/// Error when reading a file in DIMACS format.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Format { line: usize, msg: String },
    Data { line: usize, msg: String },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            Io(err) => err.fmt(fmt),
            Format { line, msg } => write!(fmt, "Format error on line {}: {}", line, msg),
            Data { line, msg } => write!(fmt, "Data error on line {}: {}", line, msg),
        }
    }
}

impl error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

struct DimacsReader<R: Read> {
    io: BufReader<R>,

    line: String,
    line_number: usize,
}

impl<R: Read> DimacsReader<R> {
    fn new(reader: R) -> Self {
        DimacsReader {
            io: BufReader::new(reader),
            line: String::new(),
            line_number: 0,
        }
    }

    // The next non-empty, non-comment line as a token iterator.
    fn read_line(&mut self) -> Result<Option<Tokens>> {
        loop {
            self.line.clear();
            if self.io.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }

            self.line_number += 1;
            let content = self.line.trim_start();
            if content.is_empty() || content.starts_with('c') {
                continue;
            }
            break;
        }
        Ok(Some(Tokens {
            it: self.line.trim_start().split_whitespace(),
            line: self.line_number,
        }))
    }

    // Expect a line with the given descriptor.
    //
    // If the next line does not have this descriptor, an error is
    // returned. Otherwise the *remaining* tokens are returned.
    fn expect_line(&mut self, descriptor: &str) -> Result<Tokens> {
        let line_number = self.line_number;
        let mut toks = self.read_line()?.ok_or_else(|| Error::Format {
            line: line_number,
            msg: format!("unexpected end of file, expected '{}' line", descriptor),
        })?;
        let d = toks.str()?;
        if d == descriptor {
            Ok(toks)
        } else {
            Err(Error::Format {
                line: toks.line,
                msg: format!("unexpected line, expected '{}', got '{}'", descriptor, d),
            })
        }
    }

    // Read the next line with one of the given descriptors.
    //
    // Returns `Ok(None)` at the end of the file, otherwise the
    // descriptor and the *remaining* tokens.
    fn read_one_line_of(&mut self, descriptors: &[&str]) -> Result<Option<(&str, Tokens)>> {
        if let Some(mut toks) = self.read_line()? {
            let d = toks.str()?;
            if descriptors.contains(&d) {
                Ok(Some((d, toks)))
            } else {
                Err(Error::Format {
                    line: toks.line,
                    msg: format!(
                        "unexpected line, expected one of '{}', got '{}'",
                        descriptors.join("', '"),
                        d
                    ),
                })
            }
        } else {
            Ok(None)
        }
    }
}

/// Iterates over the tokens in a line.
struct Tokens<'a> {
    it: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.it.next()
    }
}

impl<'a> Tokens<'a> {
    /// Return an error if the next token is not the given token.
    fn expect(&mut self, tok: &str) -> Result<()> {
        let nxt = self.str()?;
        if nxt == tok {
            Ok(())
        } else {
            Err(Error::Format {
                line: self.line,
                msg: format!("expected '{}', got '{}'", tok, nxt),
            })
        }
    }

    /// Returns the next token as `&str`.
    fn str(&mut self) -> Result<&'a str> {
        self.it.next().ok_or_else(|| Error::Format {
            line: self.line,
            msg: "expected token".to_string(),
        })
    }

    /// Returns the next token converted to a number.
    fn number<T>(&mut self) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let line = self.line;
        self.it
            .next()
            .ok_or_else(|| Error::Format {
                line,
                msg: "expected number".to_string(),
            })?
            .parse()
            .map_err(|err| Error::Format {
                line,
                msg: format!("{}", err),
            })
    }

    /// Ensures that there is no next token.
    fn end(&mut self) -> Result<()> {
        if let Some(s) = self.it.next() {
            Err(Error::Format {
                line: self.line,
                msg: format!("unexpected token at end of line: {}", s),
            })
        } else {
            Ok(())
        }
    }
}

/// Read a min-cost-flow instance in DIMACS format.
pub fn read<R, F>(r: R) -> Result<MinCostFlow<F>>
where
    R: Read,
    F: FromStr + NumAssign + PartialOrd + Copy,
    F::Err: fmt::Display,
{
    let mut reader = DimacsReader::new(r);

    // Read the problem line.
    let mut pline = reader.expect_line("p")?;
    pline.expect("min")?;
    let nnodes: usize = pline.number()?;
    let narcs: usize = pline.number()?;
    pline.end()?;

    let mut balances = vec![F::zero(); nnodes];
    let mut arcs = Vec::with_capacity(narcs);
    let mut costs = Vec::with_capacity(narcs);
    let mut upper = Vec::with_capacity(narcs);

    while let Some((d, mut toks)) = reader.read_one_line_of(&["n", "a"])? {
        if d == "n" {
            let u: usize = toks.number()?;
            if u < 1 || u > nnodes {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("invalid node id {} (must be in 1..{})", u, nnodes),
                });
            }
            balances[u - 1] = toks.number()?;
        } else {
            let u: usize = toks.number()?;
            let v: usize = toks.number()?;
            let lb: F = toks.number()?;
            let ub: F = toks.number()?;
            let c: F = toks.number()?;

            if u < 1 || u > nnodes {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("invalid source node id {} (must be in 1..{})", u, nnodes),
                });
            }
            if v < 1 || v > nnodes {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("invalid sink node id {} (must be in 1..{})", v, nnodes),
                });
            }
            if !lb.is_zero() {
                return Err(Error::Data {
                    line: toks.line,
                    msg: "nonzero lower bound (lower bounds must be 0)".to_string(),
                });
            }
            if arcs.len() == narcs {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("unexpected 'a' line (expected exactly {} arcs)", narcs),
                });
            }

            arcs.push((u - 1, v - 1));
            upper.push(ub);
            costs.push(c);
        }

        toks.end()?;
    }

    if arcs.len() != narcs {
        return Err(Error::Data {
            line: reader.line_number,
            msg: format!("expected {} arcs, got {}", narcs, arcs.len()),
        });
    }

    MinCostFlow::new(balances, arcs, costs, upper).map_err(|err| Error::Data {
        line: reader.line_number,
        msg: err.to_string(),
    })
}

/// Read a min-cost-flow instance from a named file.
pub fn read_from_file<F>(filename: &str) -> Result<MinCostFlow<F>>
where
    F: FromStr + NumAssign + PartialOrd + Copy,
    F::Err: fmt::Display,
{
    read(std::fs::File::open(filename)?)
}

/// Write a min-cost-flow instance in DIMACS format.
pub fn write<W, F>(mut w: W, flow: &MinCostFlow<F>) -> io::Result<()>
where
    W: Write,
    F: NumAssign + PartialOrd + Copy + fmt::Display,
{
    writeln!(w, "p min {} {}", flow.nr_nodes(), flow.nr_arcs())?;
    for (u, &b) in flow.balances().iter().enumerate() {
        if !b.is_zero() {
            writeln!(w, "n {} {}", u + 1, b)?;
        }
    }
    for (j, &(u, v)) in flow.arcs().iter().enumerate() {
        writeln!(w, "a {} {} 0 {} {}", u + 1, v + 1, flow.upper()[j], flow.costs()[j])?;
    }

    Ok(())
}

/// Write a min-cost-flow instance to a named file.
pub fn write_to_file<F>(filename: &str, flow: &MinCostFlow<F>) -> io::Result<()>
where
    F: NumAssign + PartialOrd + Copy + fmt::Display,
{
    write(&mut std::fs::File::create(filename)?, flow)
}

/// Read a flow vector, one value per arc in arc order.
pub fn read_flows<R, F>(r: R) -> Result<Vec<F>>
where
    R: Read,
    F: FromStr,
    F::Err: fmt::Display,
{
    let mut reader = DimacsReader::new(r);
    let mut flows = vec![];
    while let Some(mut toks) = reader.read_line()? {
        while let Some(tok) = toks.next() {
            flows.push(tok.parse().map_err(|err| Error::Format {
                line: toks.line,
                msg: format!("{}", err),
            })?);
        }
    }

    Ok(flows)
}

/// Read a flow vector from a named file.
pub fn read_flows_from_file<F>(filename: &str) -> Result<Vec<F>>
where
    F: FromStr,
    F::Err: fmt::Display,
{
    read_flows(std::fs::File::open(filename)?)
}

/// Write a flow vector, one value per line in arc order.
pub fn write_flows<W, F>(mut w: W, flows: &[F]) -> io::Result<()>
where
    W: Write,
    F: fmt::Display,
{
    for x in flows {
        writeln!(w, "{}", x)?;
    }

    Ok(())
}

/// Write a flow vector to a named file.
pub fn write_flows_to_file<F>(filename: &str, flows: &[F]) -> io::Result<()>
where
    F: fmt::Display,
{
    write_flows(&mut std::fs::File::create(filename)?, flows)
}

#[cfg(test)]
mod tests {

    use super::{read, read_flows, write, write_flows, Error};
    use crate::network::MinCostFlow;

    const SAMPLE: &str = "\
c a small network
p min 3 3

n 1 4
n 3 -4
a 1 2 0 3 1
a 2 3 0 3 1
a 1 3 0 10 5
";

    #[test]
    fn test_read() {
        let flow: MinCostFlow<f64> = read(SAMPLE.as_bytes()).unwrap();
        assert_eq!(flow.nr_nodes(), 3);
        assert_eq!(flow.nr_arcs(), 3);
        assert_eq!(flow.balances(), &[4.0, 0.0, -4.0]);
        assert_eq!(flow.arcs(), &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(flow.costs(), &[1.0, 1.0, 5.0]);
        assert_eq!(flow.upper(), &[3.0, 3.0, 10.0]);
    }

    #[test]
    fn test_write_read_round_trip() {
        let flow: MinCostFlow<f64> = read(SAMPLE.as_bytes()).unwrap();
        let mut buf = vec![];
        write(&mut buf, &flow).unwrap();
        let flow2: MinCostFlow<f64> = read(buf.as_slice()).unwrap();
        assert_eq!(flow, flow2);
    }

    #[test]
    fn test_nonzero_lower_bound_is_rejected() {
        let data = "p min 2 1\nn 1 1\nn 2 -1\na 1 2 1 2 1\n";
        match read::<_, f64>(data.as_bytes()) {
            Err(Error::Data { line: 4, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_arc_count_mismatch() {
        let data = "p min 2 2\nn 1 1\nn 2 -1\na 1 2 0 2 1\n";
        match read::<_, f64>(data.as_bytes()) {
            Err(Error::Data { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        let data = "p min 2 1\nn 1 1\nn 2 -1\na 1 2 0 2 1\na 2 1 0 2 1\n";
        match read::<_, f64>(data.as_bytes()) {
            Err(Error::Data { line: 5, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_is_rejected() {
        let data = "p min 2 1\nn 1 2\nn 2 -1\na 1 2 0 2 1\n";
        match read::<_, f64>(data.as_bytes()) {
            Err(Error::Data { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_descriptor() {
        let data = "p min 2 1\nx 1 2\n";
        match read::<_, f64>(data.as_bytes()) {
            Err(Error::Format { line: 2, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_flows_round_trip() {
        let mut buf = vec![];
        write_flows(&mut buf, &[1.5f64, 0.0, 2.0]).unwrap();
        let flows: Vec<f64> = read_flows(buf.as_slice()).unwrap();
        assert_eq!(flows, vec![1.5, 0.0, 2.0]);

        let with_comments = "c interior point\n1.5\n0.0 2.0\n";
        let flows: Vec<f64> = read_flows(with_comments.as_bytes()).unwrap();
        assert_eq!(flows, vec![1.5, 0.0, 2.0]);
    }
}
