use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::endpoint::ConnectionDescriptor;
use crate::error::{DbaasError, DbaasResult};

pub fn menu_lines(dbs: &[ConnectionDescriptor]) -> Vec<String> {
    dbs.iter()
        .enumerate()
        .map(|(i, db)| format!("{} - {}", i, db.name))
        .collect()
}

/// Validates an operator supplied index against the number of choices.
pub fn parse_selection(input: &str, len: usize) -> DbaasResult<usize> {
    let input = input.trim();
    let index: usize = input
        .parse()
        .map_err(|_| DbaasError::InvalidSelection(input.to_string()))?;

    if index >= len {
        return Err(DbaasError::SelectionOutOfRange { index, len });
    }
    Ok(index)
}

/// Prints the menu and reads one choice. `None` means the operator
/// cancelled with Ctrl-C or Ctrl-D.
pub fn prompt(dbs: &[ConnectionDescriptor]) -> DbaasResult<Option<usize>> {
    println!("{}", "Which database do you want to open shell: ".bright_cyan().bold());
    for line in menu_lines(dbs) {
        println!("{}", line);
    }

    let mut rl = DefaultEditor::new()?;
    match rl.readline(&format!("{} ", ">".green().bold())) {
        Ok(line) => parse_selection(&line, dbs.len()).map(Some),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("{}", "Cancelled".yellow());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;

    #[test]
    fn menu_has_index_and_name() {
        let dbs = Endpoint::Sentinel("sentinel://:pw@s1:26379,s2:26379".to_string())
            .descriptors("cache")
            .unwrap();
        assert_eq!(
            menu_lines(&dbs),
            vec!["0 - redis: cache via s1", "1 - redis: cache via s2"]
        );
    }

    #[test]
    fn selection_is_bounds_checked() {
        assert_eq!(parse_selection(" 1\n", 2).unwrap(), 1);
        assert!(matches!(
            parse_selection("2", 2),
            Err(DbaasError::SelectionOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(parse_selection("-1", 2), Err(DbaasError::InvalidSelection(_))));
        assert!(matches!(parse_selection("first", 2), Err(DbaasError::InvalidSelection(ref s)) if s == "first"));
        assert!(matches!(parse_selection("0", 0), Err(DbaasError::SelectionOutOfRange { .. })));
    }
}
