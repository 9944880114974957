// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! Reader of unit definitions: `[Section]` headers followed by `Key=Value`
//! lines. `#` and `;` start comments, a trailing `\` joins the next line.
//! Clause errors are collected, not returned on the first one, so a broken
//! definition reports all of its problems at once.
#![allow(non_snake_case)]
use crate::error::*;
use crate::unit::UnitRelations;
use nom::{
    branch::alt,
    bytes::complete::{is_a, is_not, take_till, take_while1},
    character::complete::{char, line_ending, not_line_ending, space0},
    combinator::value,
    error::ErrorKind,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};
use std::io::Read;

/// One `Key=Value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfEntry {
    /// line number in the definition, starting at 1
    pub line: usize,
    ///
    pub key: String,
    ///
    pub value: String,
}

impl ConfEntry {
    /// describe a problem with this entry
    pub fn invalid(&self, what: &str) -> String {
        format!("line {}: {} '{}={}'", self.line, what, self.key, self.value)
    }

    /// space separated unit names
    pub fn list(&self) -> Vec<String> {
        self.value.split_whitespace().map(String::from).collect()
    }

    /// parse a boolean, pushing a clause error for anything else
    pub fn boolean(&self, errors: &mut Vec<String>) -> Option<bool> {
        match self.value.to_lowercase().as_str() {
            "1" | "yes" | "y" | "true" | "t" | "on" => Some(true),
            "0" | "no" | "n" | "false" | "f" | "off" => Some(false),
            _ => {
                errors.push(self.invalid("invalid boolean"));
                None
            }
        }
    }
}

/// All entries below one `[Name]` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfSection {
    ///
    pub name: String,
    ///
    pub entries: Vec<ConfEntry>,
}

/// Split the definition into sections. Syntax errors land in `errors`,
/// only a failing reader is returned as `Err`.
pub fn read_sections(source: &mut dyn Read, errors: &mut Vec<String>) -> Result<Vec<ConfSection>> {
    let mut text = String::new();
    source.read_to_string(&mut text).context(IoSnafu)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let mut sections: Vec<ConfSection> = Vec::new();
    let mut input = text.as_str();
    let mut line = 1;

    while !input.is_empty() {
        let rest = match clause(input) {
            Ok((rest, Clause::Blank)) | Ok((rest, Clause::Comment)) => rest,
            Ok((rest, Clause::Section(name))) => {
                sections.push(ConfSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                rest
            }
            Ok((rest, Clause::Entry(key, value))) => {
                match sections.last_mut() {
                    Some(section) => section.entries.push(ConfEntry {
                        line,
                        key: key.to_string(),
                        value,
                    }),
                    None => errors.push(format!("line {}: '{}' outside of any section", line, key)),
                }
                rest
            }
            Err(e) => {
                let (rest, content) = skip_line(input);
                errors.push(clause_error(line, content.trim(), &e));
                rest
            }
        };
        line += input[..input.len() - rest.len()].matches('\n').count();
        input = rest;
    }

    Ok(sections)
}

/// One logical line of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause<'a> {
    Blank,
    Comment,
    Section(&'a str),
    Entry(&'a str, String),
}

fn clause(i: &str) -> IResult<&str, Clause> {
    alt((blank, comment, section_header, entry))(i)
}

fn clause_error(line: usize, content: &str, e: &nom::Err<nom::error::Error<&str>>) -> String {
    if let nom::Err::Failure(err) = e {
        if err.code == ErrorKind::Eof {
            return format!("line {}: unterminated line continuation", line);
        }
    }
    if content.starts_with('[') {
        return format!("line {}: malformed section header '{}'", line, content);
    }
    format!("line {}: expected 'Key=Value', got '{}'", line, content)
}

/// the line a clause failed on, and the input after it
fn skip_line(i: &str) -> (&str, &str) {
    let content = match i.find('\n') {
        None => i,
        Some(pos) => &i[..pos],
    };
    (&i[(content.len() + 1).min(i.len())..], content)
}

fn blank(i: &str) -> IResult<&str, Clause> {
    value(Clause::Blank, terminated(space0, line_ending))(i)
}

fn comment(i: &str) -> IResult<&str, Clause> {
    value(
        Clause::Comment,
        tuple((space0, is_a("#;"), not_line_ending, line_ending)),
    )(i)
}

fn section_header(i: &str) -> IResult<&str, Clause> {
    let (i, name) = delimited(
        preceded(space0, char('[')),
        is_not("[]\r\n"),
        terminated(char(']'), space0),
    )(i)?;
    let (i, _) = line_ending(i)?;
    match name.trim() {
        "" => Err(nom::Err::Error(nom::error::Error::new(i, ErrorKind::Tag))),
        name => Ok((i, Clause::Section(name))),
    }
}

fn key(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')(i)
}

// returns (key, value) pair
fn entry(i: &str) -> IResult<&str, Clause> {
    let (i, (key, value)) = preceded(
        space0,
        separated_pair(key, delimited(space0, char('='), space0), entry_value),
    )(i)?;
    Ok((i, Clause::Entry(key, value)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    End,
    Join,
    Backslash,
}

/// The rest of the line. A `\` ending the line joins the next one with a
/// single space.
fn entry_value(i: &str) -> IResult<&str, String> {
    let mut result = String::new();
    let mut i = i;
    loop {
        let (rest, segment) = take_till(|c: char| c == '\\' || c == '\n' || c == '\r')(i)?;
        result.push_str(segment);
        let (rest, tail) = alt((
            value(Tail::Join, tuple((char('\\'), space0, line_ending, space0))),
            value(Tail::End, line_ending),
            value(Tail::Backslash, char('\\')),
        ))(rest)?;
        i = rest;

        match tail {
            Tail::End => break,
            Tail::Backslash => result.push('\\'),
            Tail::Join => {
                if i.is_empty() {
                    return Err(nom::Err::Failure(nom::error::Error::new(i, ErrorKind::Eof)));
                }
                let kept = result.trim_end().len();
                result.truncate(kept);
                result.push(' ');
            }
        }
    }

    let kept = result.trim_end().len();
    result.truncate(kept);
    Ok((i, result))
}

/// Turn collected clause errors into the result of `define`.
pub fn finish(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(Error::DefinitionInvalid { errors })
}

/// The `[Unit]` section every kind shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSection {
    ///
    pub Description: String,
    ///
    pub Documentation: Vec<String>,
    ///
    pub Requires: Vec<String>,
    ///
    pub Wants: Vec<String>,
    ///
    pub After: Vec<String>,
    ///
    pub Before: Vec<String>,
    ///
    pub Conflicts: Vec<String>,
    ///
    pub IgnoreOnIsolate: bool,
}

impl UnitSection {
    /// Apply one entry. An empty list value resets what earlier lines added.
    pub fn parse_entry(&mut self, entry: &ConfEntry, errors: &mut Vec<String>) {
        let list = match entry.key.as_str() {
            "Description" => {
                self.Description = entry.value.clone();
                return;
            }
            "IgnoreOnIsolate" => {
                if let Some(v) = entry.boolean(errors) {
                    self.IgnoreOnIsolate = v;
                }
                return;
            }
            "Documentation" => &mut self.Documentation,
            "Requires" => &mut self.Requires,
            "Wants" => &mut self.Wants,
            "After" => &mut self.After,
            "Before" => &mut self.Before,
            "Conflicts" => &mut self.Conflicts,
            _ => {
                errors.push(entry.invalid("unknown key in [Unit]"));
                return;
            }
        };

        if entry.value.is_empty() {
            list.clear();
            return;
        }
        for name in entry.list() {
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }

    ///
    pub fn dependencies(&self, relation: UnitRelations) -> Vec<String> {
        match relation {
            UnitRelations::UnitRequires => self.Requires.clone(),
            UnitRelations::UnitWants => self.Wants.clone(),
            UnitRelations::UnitConflicts => self.Conflicts.clone(),
            UnitRelations::UnitBefore => self.Before.clone(),
            UnitRelations::UnitAfter => self.After.clone(),
        }
    }
}
