//! Console prompts and operator input parsing

use anyhow::Result;
use colored::*;
use dialoguer::{Confirm, Input};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("No employees selected")]
    NothingSelected,
}

/// Parse space-separated 1-based numbers into 0-based indices below `count`
///
/// Out-of-range numbers are ignored and repeats collapse to their first
/// occurrence. Any token that is not an integer rejects the whole input.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, SelectionError> {
    let mut picked = Vec::new();

    for token in input.split_whitespace() {
        let number: i64 = token.parse().map_err(|_| SelectionError::InvalidInput)?;
        let Some(index) = number.checked_sub(1).and_then(|n| usize::try_from(n).ok()) else {
            continue;
        };
        if index < count && !picked.contains(&index) {
            picked.push(index);
        }
    }

    if picked.is_empty() {
        return Err(SelectionError::NothingSelected);
    }
    Ok(picked)
}

/// Parse a menu choice in `0..=max`
pub fn parse_choice(input: &str, max: usize) -> Option<usize> {
    input.trim().parse().ok().filter(|n| *n <= max)
}

/// Free-text prompt; blank answers are allowed
pub fn ask(prompt: &str) -> Result<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(answer.trim().to_string())
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

pub fn pause() -> Result<()> {
    ask("Press Enter to continue")?;
    Ok(())
}

/// Print a numbered list starting at 1
pub fn print_numbered<S: AsRef<str>>(items: &[S]) {
    for (i, item) in items.iter().enumerate() {
        println!(" {}. {}", (i + 1).to_string().cyan(), item.as_ref());
    }
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", "✗".red(), message);
}
