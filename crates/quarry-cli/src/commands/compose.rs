//! Compose a world-view message by hand.
//!
//! Prompts go to stderr and the encoded 52 bytes to stdout, so the output
//! can be piped straight into an agent program:
//!
//! ```text
//! quarry compose | quarry-hunter 5 5 | xxd
//! ```

use anyhow::{bail, Context, Result};
use quarry_core::protocol::{WorldView, MAX_OBJECTS};
use quarry_core::types::Coordinate;
use std::io::{self, BufRead, Write};

pub fn run() -> Result<()> {
    let view = compose(io::stdin().lock(), io::stderr())?;
    let mut out = io::stdout().lock();
    view.write_to(&mut out)
        .context("Failed to write the message")?;
    Ok(())
}

/// Ask for each field in wire order and build the view.
pub fn compose<R: BufRead, W: Write>(input: R, prompt: W) -> Result<WorldView> {
    let mut form = Form {
        lines: input.lines(),
        pending: Vec::new(),
        prompt,
    };

    let position = form.coordinate("position (x y)")?;
    let adversary = form.coordinate("adversary (x y)")?;
    let count = form.int("blocked neighbor count")?;
    let count = match usize::try_from(count) {
        Ok(n) if n <= MAX_OBJECTS => n,
        _ => bail!("blocked neighbor count must be 0 to {}, got {}", MAX_OBJECTS, count),
    };

    let mut objects = Vec::with_capacity(count);
    for i in 0..count {
        objects.push(form.coordinate(&format!("blocked neighbor {} (x y)", i + 1))?);
    }

    Ok(WorldView::new(position, adversary, &objects))
}

struct Form<L, W> {
    lines: L,
    pending: Vec<String>,
    prompt: W,
}

impl<L, W> Form<L, W>
where
    L: Iterator<Item = io::Result<String>>,
    W: Write,
{
    fn int(&mut self, label: &str) -> Result<i32> {
        if self.pending.is_empty() {
            write!(self.prompt, "{}: ", label)?;
            self.prompt.flush()?;
        }
        while self.pending.is_empty() {
            let line = match self.lines.next() {
                Some(line) => line.context("Failed to read input")?,
                None => bail!("input ended before {}", label),
            };
            self.pending = line.split_whitespace().rev().map(str::to_string).collect();
        }
        let token = self.pending.pop().unwrap_or_default();
        token
            .parse()
            .with_context(|| format!("{}: {:?} is not an integer", label, token))
    }

    fn coordinate(&mut self, label: &str) -> Result<Coordinate> {
        let x = self.int(label)?;
        let y = self.int(label)?;
        Ok(Coordinate::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_view_from_typed_fields() {
        let input = "1 2\n3 4\n2\n1 3\n0\n2\n";
        let mut prompts = Vec::new();
        let view = compose(input.as_bytes(), &mut prompts).unwrap();

        assert_eq!(view.position, Coordinate::new(1, 2));
        assert_eq!(view.adversary, Coordinate::new(3, 4));
        assert_eq!(view.objects(), &[Coordinate::new(1, 3), Coordinate::new(0, 2)]);

        let prompts = String::from_utf8(prompts).unwrap();
        assert!(prompts.starts_with("position (x y): adversary (x y): "));
        assert!(prompts.contains("blocked neighbor 2 (x y): "));
    }

    #[test]
    fn accepts_everything_on_one_line() {
        let view = compose("0 0 4 0 0\n".as_bytes(), io::sink()).unwrap();
        assert_eq!(view.adversary, Coordinate::new(4, 0));
        assert!(view.objects().is_empty());
    }

    #[test]
    fn rejects_bad_count_and_short_input() {
        let err = compose("0 0 1 1 5\n".as_bytes(), io::sink()).unwrap_err();
        assert!(err.to_string().contains("must be 0 to 4"));

        let err = compose("0 0 1\n".as_bytes(), io::sink()).unwrap_err();
        assert!(err.to_string().contains("input ended"));

        let err = compose("0 zero\n".as_bytes(), io::sink()).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }
}
