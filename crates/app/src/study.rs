//! Terminal front end for a study flow: show a card, flip it, self-grade.

use std::error::Error;
use std::io::{BufRead, Write};

use kotoba_core::Clock;
use kotoba_core::quiz::{SessionConfig, StudyFlow};

pub fn run_study<R: BufRead, W: Write>(
    flow: &mut StudyFlow,
    config: SessionConfig,
    clock: Clock,
    input: &mut R,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    flow.start(config, clock.now(), &mut rand::rng())?;
    writeln!(
        out,
        "{} ({} words). Enter flips the card, q quits.",
        flow.lesson_title(),
        flow.words().len()
    )?;

    loop {
        if flow.summary().is_some() {
            if results_menu(flow, clock, input, out)? {
                continue;
            }
            return Ok(());
        }

        let Some(progress) = flow.progress() else {
            return Ok(());
        };
        if let Some(card) = flow.card() {
            writeln!(out)?;
            writeln!(
                out,
                "[{}/{}]  ✓ {}  ✗ {}",
                progress.current, progress.total, progress.correct, progress.incorrect
            )?;
            writeln!(out, "{}: {}", card.front_label, card.front)?;
        }
        out.flush()?;
        match read_line(input)?.as_deref() {
            None | Some("q") => return Ok(()),
            Some(_) => {}
        }

        flow.flip()?;
        if let Some(card) = flow.card() {
            writeln!(out, "{}: {}", card.back_label, card.back)?;
            if let Some(furigana) = card.furigana {
                writeln!(out, "  furigana: {furigana}")?;
            }
            if let Some(pronunciation) = card.pronunciation {
                writeln!(out, "  pronunciation: {pronunciation}")?;
            }
        }

        let Some(correct) = ask_known(input, out)? else {
            return Ok(());
        };
        flow.answer(correct, clock.now())?;
    }
}

/// Returns `true` when a new round was started.
fn results_menu<R: BufRead, W: Write>(
    flow: &mut StudyFlow,
    clock: Clock,
    input: &mut R,
    out: &mut W,
) -> Result<bool, Box<dyn Error>> {
    if let Some(summary) = flow.summary() {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            if summary.is_excellent() {
                "Excellent work!"
            } else {
                "Keep practicing!"
            }
        )?;
        writeln!(
            out,
            "Cards: {}  Correct: {}  Incorrect: {}  Accuracy: {}%  Time: {}",
            summary.total_cards(),
            summary.correct(),
            summary.incorrect(),
            summary.accuracy_percent(),
            summary.duration_label()
        )?;
    }
    if let Some(session) = flow.session() {
        for word in session.incorrect_words() {
            writeln!(out, "  ✗ {} - {}", word.japanese(), word.ukrainian())?;
        }
    }

    let offer_incorrect = flow.has_incorrect();
    loop {
        if offer_incorrect {
            write!(out, "[r] retry  [i] repeat incorrect  [q] quit > ")?;
        } else {
            write!(out, "[r] retry  [q] quit > ")?;
        }
        out.flush()?;
        match read_line(input)?.as_deref() {
            None | Some("q") => return Ok(false),
            Some("r") => {
                flow.retry(clock.now(), &mut rand::rng())?;
                return Ok(true);
            }
            Some("i") if offer_incorrect => {
                flow.repeat_incorrect(clock.now())?;
                return Ok(true);
            }
            Some(_) => {}
        }
    }
}

fn ask_known<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<bool>, Box<dyn Error>> {
    loop {
        write!(out, "Did you know it? [y/n] > ")?;
        out.flush()?;
        match read_line(input)?.as_deref() {
            None => return Ok(None),
            Some("y" | "yes") => return Ok(Some(true)),
            Some("n" | "no") => return Ok(Some(false)),
            Some(_) => {}
        }
    }
}

/// Next trimmed, lowercased line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use kotoba_core::model::{LessonId, WordDraft, WordId, WordPair};
    use kotoba_core::quiz::Direction;
    use kotoba_core::time::{fixed_clock, fixed_now};

    fn word(id: u64, japanese: &str, ukrainian: &str) -> WordPair {
        WordDraft::pair(japanese, ukrainian)
            .validate(WordId::new(id), LessonId::new(1), fixed_now())
            .unwrap()
    }

    fn flow() -> StudyFlow {
        StudyFlow::new(
            "Тварини",
            vec![word(1, "犬", "собака"), word(2, "猫", "кіт"), word(3, "鳥", "птах")],
        )
    }

    fn play(flow: &mut StudyFlow, config: SessionConfig, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_study(flow, config, fixed_clock(), &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn one_round_reports_accuracy_and_misses() {
        let mut flow = flow();
        let out = play(&mut flow, SessionConfig::default(), "\ny\n\nn\n\ny\nq\n");

        assert!(out.contains("日本語: 犬"));
        assert!(out.contains("Cards: 3  Correct: 2  Incorrect: 1  Accuracy: 67%"));
        assert!(out.contains("✗ 猫 - кіт"));
        assert!(out.contains("Keep practicing!"));
        assert_eq!(flow.summary().map(|s| s.correct()), Some(2));
    }

    #[test]
    fn repeat_incorrect_runs_only_the_misses() {
        let mut flow = flow();
        let out = play(&mut flow, SessionConfig::default(), "\ny\n\nn\n\ny\ni\n\ny\nq\n");

        assert!(out.contains("Cards: 1  Correct: 1  Incorrect: 0  Accuracy: 100%"));
        assert!(out.contains("Excellent work!"));
        assert_eq!(flow.session().map(|s| s.total_cards()), Some(1));
    }

    #[test]
    fn reverse_direction_prompts_in_ukrainian() {
        let mut flow = flow();
        let config = SessionConfig::new(Direction::UkrainianFirst, false);
        let out = play(&mut flow, config, "q\n");

        assert!(out.contains("Українська: собака"));
        assert!(!out.contains("Accuracy"));
    }

    #[test]
    fn unrecognized_grades_are_asked_again() {
        let mut flow = flow();
        let out = play(&mut flow, SessionConfig::default(), "\nmaybe\ny\n");

        assert_eq!(out.matches("Did you know it?").count(), 2);
        assert_eq!(flow.progress().map(|p| p.correct), Some(1));
    }

    #[test]
    fn empty_lesson_fails_to_start() {
        let mut flow = StudyFlow::new("Порожньо", Vec::new());
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();
        let result = run_study(
            &mut flow,
            SessionConfig::default(),
            fixed_clock(),
            &mut input,
            &mut out,
        );
        assert!(result.is_err());
    }
}
