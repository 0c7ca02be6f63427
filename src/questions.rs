//! Question cycle: endless, order-preserving rotation over a fixed list.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::QaError;

/// Infinite iterator over a fixed, non-empty list of questions.
///
/// Each full pass yields the list in its original order. The backing list is
/// shared and immutable; only the position belongs to this cycle.
#[derive(Debug, Clone)]
pub struct QuestionCycle {
    questions: Arc<[String]>,
    position: usize,
}

impl QuestionCycle {
    pub fn new<I, S>(questions: I) -> Result<Self, QaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Arc<[String]> = questions.into_iter().map(Into::into).collect();
        if questions.is_empty() {
            return Err(QaError::EmptyCycle);
        }
        Ok(Self {
            questions,
            position: 0,
        })
    }

    /// The question after the previously returned one, wrapping around.
    pub fn next_question(&mut self) -> &str {
        let current = self.position;
        self.position = (current + 1) % self.questions.len();
        &self.questions[current]
    }

    /// Start over from the first question.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Never true; a cycle cannot be built from an empty list.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Iterator for QuestionCycle {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_question().to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// A cycle with a fixed delay in front of every pull.
pub struct PacedQuestions {
    cycle: QuestionCycle,
    pace: Duration,
}

impl PacedQuestions {
    pub fn new(cycle: QuestionCycle, pace: Duration) -> Self {
        Self { cycle, pace }
    }

    /// Pick the next question, wait out the pace, then hand it back.
    pub async fn next(&mut self) -> String {
        let question = self.cycle.next_question().to_string();
        tokio::time::sleep(self.pace).await;
        debug!(question = %question, "Asked");
        question
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    fn questions() -> Vec<&'static str> {
        vec!["What is 2+2?", "Capital of France?", "Who wrote Hamlet?"]
    }

    #[test]
    fn one_pass_yields_source_order() {
        let cycle = QuestionCycle::new(questions()).unwrap();
        let pulled: Vec<String> = cycle.take(3).collect();
        assert_eq!(pulled, questions());
    }

    #[test]
    fn two_passes_repeat_identically() {
        let cycle = QuestionCycle::new(questions()).unwrap();
        let pulled: Vec<String> = cycle.take(6).collect();
        assert_eq!(pulled[..3], pulled[3..]);
        assert_eq!(pulled[..3], questions());
    }

    #[test]
    fn never_exhausts() {
        let mut cycle = QuestionCycle::new(["only"]).unwrap();
        for _ in 0..1_000 {
            assert_eq!(cycle.next().as_deref(), Some("only"));
        }
    }

    #[test]
    fn restart_goes_back_to_first() {
        let mut cycle = QuestionCycle::new(questions()).unwrap();
        cycle.next_question();
        cycle.next_question();
        cycle.restart();
        assert_eq!(cycle.next_question(), "What is 2+2?");
    }

    #[test]
    fn clones_advance_independently() {
        let mut a = QuestionCycle::new(questions()).unwrap();
        a.next_question();
        let mut b = a.clone();
        assert_eq!(a.next_question(), "Capital of France?");
        assert_eq!(b.next_question(), "Capital of France?");
    }

    #[test]
    fn empty_list_is_rejected() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(QuestionCycle::new(empty), Err(QaError::EmptyCycle)));
    }

    #[tokio::test(start_paused = true)]
    async fn paced_pull_waits() {
        let cycle = QuestionCycle::new(questions()).unwrap();
        let mut paced = PacedQuestions::new(cycle, Duration::from_secs(1));

        let start = Instant::now();
        assert_eq!(paced.next().await, "What is 2+2?");
        assert_eq!(paced.next().await, "Capital of France?");
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
