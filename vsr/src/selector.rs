use crate::{Error, Result, manifest::Quality};
use requestty::Question;
use std::io::{self, Write};

/// Picks one label out of a list, returning its index.
pub trait Choose {
    fn choose(&self, labels: &[String]) -> Result<usize>;
}

/// How the user is asked to choose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Arrow key selection.
    Modern,
    /// Numbered list read from stdin, for old and unsupported terminals.
    Raw,
    /// No prompt, the first (best) entry is taken.
    None,
}

impl Interaction {
    pub fn new(raw: bool, skip: bool) -> Self {
        if skip {
            Self::None
        } else if raw {
            Self::Raw
        } else {
            Self::Modern
        }
    }
}

impl Choose for Interaction {
    fn choose(&self, labels: &[String]) -> Result<usize> {
        match self {
            Self::Modern => {
                let question = Question::select("quality")
                    .message("Select quality")
                    .should_loop(false)
                    .choices(labels.to_vec())
                    .build();
                let answer =
                    requestty::prompt_one(question).map_err(|e| Error::Prompt(e.to_string()))?;

                answer
                    .as_list_item()
                    .map(|x| x.index)
                    .ok_or_else(|| Error::Prompt("no quality selected".to_owned()))
            }
            Self::Raw => {
                println!("Select quality:");

                for (i, label) in labels.iter().enumerate() {
                    println!("{:2}) [{}] {}", i + 1, if i == 0 { 'x' } else { ' ' }, label);
                }

                println!("------------------------------");
                print!(
                    "Press enter to proceed with defaults.\n\
                    Or select quality to play (1, 2, etc.): "
                );

                let prompt_error = |e: io::Error| Error::Prompt(e.to_string());
                io::stdout().flush().map_err(prompt_error)?;
                let mut input = String::new();
                io::stdin().read_line(&mut input).map_err(prompt_error)?;
                println!("------------------------------");

                parse_choice(&input, labels.len())
            }
            Self::None => Ok(0),
        }
    }
}

/// Reads a 1-based index. Empty input is the default first entry.
fn parse_choice(input: &str, len: usize) -> Result<usize> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(0);
    }

    match input.parse::<usize>() {
        Ok(x) if (1..=len).contains(&x) => Ok(x - 1),
        Ok(_) => Err(Error::Prompt(
            "selected quality is out of index bounds.".to_owned(),
        )),
        Err(_) => Err(Error::Prompt(
            "input is not a valid positive number.".to_owned(),
        )),
    }
}

/// Qualities ordered best first: height, then bandwidth, both descending.
/// Equal entries keep their manifest order.
pub fn ranked(qualities: &[Quality]) -> Vec<&Quality> {
    let mut ranked = qualities.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| (b.height, b.bandwidth).cmp(&(a.height, a.bandwidth)));
    ranked
}

pub fn best(qualities: &[Quality]) -> Option<&Quality> {
    ranked(qualities).into_iter().next()
}

/// Takes the best quality when `best_only` is set or there is nothing to
/// choose between, otherwise defers to `chooser`.
pub fn select<'a>(qualities: &'a [Quality], best_only: bool, chooser: &dyn Choose) -> Result<&'a Quality> {
    let ranked = ranked(qualities);

    if ranked.is_empty() {
        return Err(Error::NoQualities);
    }

    let index = if best_only || ranked.len() == 1 {
        0
    } else {
        let labels = ranked.iter().map(|x| x.label()).collect::<Vec<_>>();
        chooser.choose(&labels)?
    };

    ranked
        .get(index)
        .copied()
        .ok_or_else(|| Error::Prompt("selected quality is out of index bounds.".to_owned()))
}
