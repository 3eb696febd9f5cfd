//! 练习调度器
//!
//! 显示单词 `speed_ms` -> 空白 `delay_ms` -> 下一个单词，无限循环。
//! 每个调度器只持有一个待执行步骤，暂停/停止时直接丢弃，
//! 因此不会有过期的回调修改状态。

use std::time::Instant;

use rand::Rng;
use uuid::Uuid;

use crate::codec::SEPARATOR;
use crate::error::{AppError, Result};
use crate::models::WordList;
use crate::shuffle::{shuffle, shuffle_in_place};

/// 毫秒时钟
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// 单调系统时钟
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// 显示输出
pub trait DisplaySurface {
    fn show_word(&mut self, word: &str);
    fn show_blank(&mut self);
    fn show_paused(&mut self);
}

/// 练习参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseConfig {
    pub speed_ms: u64,
    pub delay_ms: u64,
    pub shuffle_words: bool,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            speed_ms: 1000,
            delay_ms: 200,
            shuffle_words: true,
        }
    }
}

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Paused,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Hide,
    Advance,
}

#[derive(Debug, Clone, Copy)]
struct PendingStep {
    due_ms: u64,
    step: Step,
}

/// 一次练习
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    session_id: Uuid,
    source_list_id: Option<String>,
    sequence: Vec<String>,
    position: usize,
    displayed_count: u64,
    config: ExerciseConfig,
}

impl ExerciseSession {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn source_list_id(&self) -> Option<&str> {
        self.source_list_id.as_deref()
    }

    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn displayed_count(&self) -> u64 {
        self.displayed_count
    }

    pub fn config(&self) -> ExerciseConfig {
        self.config
    }

    pub fn current_word(&self) -> &str {
        &self.sequence[self.position]
    }

    /// 前进一个位置；到达末尾时回到 0，并按配置重新打乱
    fn step_forward<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position += 1;
        self.displayed_count += 1;

        if self.position >= self.sequence.len() {
            self.position = 0;
            if self.config.shuffle_words {
                shuffle_in_place(&mut self.sequence, rng);
            }
        }
    }
}

pub struct ExerciseScheduler<D, C, R> {
    display: D,
    clock: C,
    rng: R,
    state: SchedulerState,
    session: Option<ExerciseSession>,
    pending: Option<PendingStep>,
}

impl<D, C, R> ExerciseScheduler<D, C, R>
where
    D: DisplaySurface,
    C: Clock,
    R: Rng,
{
    pub fn new(display: D, clock: C, rng: R) -> Self {
        Self {
            display,
            clock,
            rng,
            state: SchedulerState::Stopped,
            session: None,
            pending: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != SchedulerState::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state == SchedulerState::Paused
    }

    pub fn session(&self) -> Option<&ExerciseSession> {
        self.session.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// 下一个步骤的到期时间（用于事件循环的等待时长）
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }

    /// 距下一个步骤的毫秒数
    pub fn ms_until_due(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.next_due_ms().map(|due| due.saturating_sub(now))
    }

    /// 以列表开始练习
    pub fn start_list(&mut self, list: &WordList, config: ExerciseConfig) -> Result<()> {
        self.start(list.exercise_words(), config)?;
        if let Some(session) = self.session.as_mut() {
            session.source_list_id = Some(list.id().to_string());
        }
        Ok(())
    }

    /// 开始练习，初始为暂停状态且不显示单词
    pub fn start(&mut self, words: Vec<String>, config: ExerciseConfig) -> Result<()> {
        let words: Vec<String> = words.into_iter().filter(|w| w != SEPARATOR).collect();
        if words.is_empty() {
            return Err(AppError::InvalidInput("no words selected".to_string()));
        }

        self.pending = None;
        let sequence = if config.shuffle_words {
            shuffle(&words, &mut self.rng)
        } else {
            words
        };

        let session = ExerciseSession {
            session_id: Uuid::new_v4(),
            source_list_id: None,
            sequence,
            position: 0,
            displayed_count: 0,
            config,
        };
        log::info!(
            "Session {} started with {} word(s) (speed {}ms, delay {}ms, shuffle {})",
            session.session_id,
            session.sequence.len(),
            config.speed_ms,
            config.delay_ms,
            config.shuffle_words
        );

        self.session = Some(session);
        self.state = SchedulerState::Paused;
        self.display.show_paused();
        Ok(())
    }

    pub fn resume(&mut self) {
        if self.state != SchedulerState::Paused {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };

        self.state = SchedulerState::Active;
        self.display.show_word(session.current_word());
        let speed_ms = session.config.speed_ms;
        self.schedule(Step::Hide, speed_ms);
    }

    pub fn pause(&mut self) {
        if self.state != SchedulerState::Active {
            return;
        }
        self.pending = None;
        self.state = SchedulerState::Paused;
        self.display.show_paused();
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SchedulerState::Paused => self.resume(),
            SchedulerState::Active => self.pause(),
            SchedulerState::Stopped => {}
        }
    }

    pub fn stop(&mut self) {
        self.pending = None;
        self.state = SchedulerState::Stopped;
        if let Some(session) = self.session.take() {
            log::info!(
                "Session {} stopped after {} word(s)",
                session.session_id,
                session.displayed_count
            );
        }
    }

    /// 暂停时手动跳到下一个单词
    pub fn advance(&mut self) -> bool {
        if self.state != SchedulerState::Paused {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        session.step_forward(&mut self.rng);
        self.display.show_word(session.current_word());
        true
    }

    /// 执行已到期的步骤（每次调用最多一个）
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let Some(pending) = self.pending else {
            return;
        };
        if pending.due_ms > now {
            return;
        }
        self.pending = None;

        if self.state != SchedulerState::Active {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match pending.step {
            Step::Hide => {
                self.display.show_blank();
                let delay_ms = session.config.delay_ms;
                self.schedule(Step::Advance, delay_ms);
            }
            Step::Advance => {
                session.step_forward(&mut self.rng);
                self.display.show_word(session.current_word());
                let speed_ms = session.config.speed_ms;
                self.schedule(Step::Hide, speed_ms);
            }
        }
    }

    /// 替换唯一的待执行步骤；到期时间饱和在 u64::MAX
    fn schedule(&mut self, step: Step, after_ms: u64) {
        self.pending = Some(PendingStep {
            due_ms: self.clock.now_ms().saturating_add(after_ms),
            step,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Word(String),
        Blank,
        Paused,
    }

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<Shown>,
    }

    impl DisplaySurface for Recorder {
        fn show_word(&mut self, word: &str) {
            self.events.push(Shown::Word(word.to_string()));
        }

        fn show_blank(&mut self) {
            self.events.push(Shown::Blank);
        }

        fn show_paused(&mut self) {
            self.events.push(Shown::Paused);
        }
    }

    type TestScheduler = ExerciseScheduler<Recorder, ManualClock, StdRng>;

    fn create_test_scheduler() -> (TestScheduler, ManualClock) {
        let clock = ManualClock::default();
        let scheduler =
            ExerciseScheduler::new(Recorder::default(), clock.clone(), StdRng::seed_from_u64(9));
        (scheduler, clock)
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ordered(speed_ms: u64, delay_ms: u64) -> ExerciseConfig {
        ExerciseConfig {
            speed_ms,
            delay_ms,
            shuffle_words: false,
        }
    }

    fn word(w: &str) -> Shown {
        Shown::Word(w.to_string())
    }

    #[test]
    fn test_start_rejects_empty() {
        let (mut scheduler, _clock) = create_test_scheduler();

        let err = scheduler.start(Vec::new(), ordered(100, 10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.session().is_none());
        assert!(scheduler.display().events.is_empty());

        // 只有分隔符也视为空
        assert!(scheduler.start(words(&["-----"]), ordered(100, 10)).is_err());
    }

    #[test]
    fn test_start_leaves_running_session_untouched_on_error() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(100, 10)).unwrap();
        scheduler.resume();

        assert!(scheduler.start(Vec::new(), ordered(100, 10)).is_err());
        assert_eq!(scheduler.state(), SchedulerState::Active);
        assert_eq!(scheduler.session().unwrap().sequence().len(), 2);
        assert!(scheduler.next_due_ms().is_some());
    }

    #[test]
    fn test_start_enters_paused_without_word() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(100, 10)).unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Paused);
        assert!(scheduler.is_running());
        assert_eq!(scheduler.display().events, vec![Shown::Paused]);
        assert!(scheduler.next_due_ms().is_none());

        let session = scheduler.session().unwrap();
        assert_eq!(session.position(), 0);
        assert_eq!(session.displayed_count(), 0);
    }

    #[test]
    fn test_start_filters_separators() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler
            .start(words(&["a", "-----", "b"]), ordered(100, 10))
            .unwrap();
        assert_eq!(scheduler.session().unwrap().sequence(), words(&["a", "b"]));
    }

    #[test]
    fn test_start_shuffles_when_enabled() {
        let (mut scheduler, _clock) = create_test_scheduler();
        let input = words(&["a", "b", "c", "d", "e", "f"]);
        let config = ExerciseConfig {
            shuffle_words: true,
            ..ordered(100, 10)
        };
        scheduler.start(input.clone(), config).unwrap();

        let mut sequence = scheduler.session().unwrap().sequence().to_vec();
        sequence.sort();
        assert_eq!(sequence, input);
    }

    #[test]
    fn test_start_list_records_source() {
        let (mut scheduler, _clock) = create_test_scheduler();
        let list = crate::codec::parse("a\n-----\nb", "lettres.txt").unwrap();
        scheduler.start_list(&list, ordered(100, 10)).unwrap();

        let session = scheduler.session().unwrap();
        assert_eq!(session.source_list_id(), Some("lettres"));
        assert_eq!(session.sequence(), words(&["a", "b"]));
    }

    #[test]
    fn test_timed_cycle() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(100, 20)).unwrap();
        scheduler.resume();
        assert_eq!(scheduler.state(), SchedulerState::Active);

        clock.advance(99);
        scheduler.tick();
        clock.advance(1);
        scheduler.tick();
        clock.advance(20);
        scheduler.tick();

        assert_eq!(
            scheduler.display().events,
            vec![Shown::Paused, word("a"), Shown::Blank, word("b")]
        );
        assert_eq!(scheduler.session().unwrap().displayed_count(), 1);
        assert_eq!(scheduler.next_due_ms(), Some(220));

        clock.advance(30);
        assert_eq!(scheduler.ms_until_due(), Some(70));
    }

    #[test]
    fn test_huge_speed_saturates_deadline() {
        let (mut scheduler, clock) = create_test_scheduler();
        clock.advance(5);
        scheduler
            .start(words(&["a", "b"]), ordered(u64::MAX, u64::MAX))
            .unwrap();
        scheduler.resume();

        assert_eq!(scheduler.next_due_ms(), Some(u64::MAX));
        assert_eq!(scheduler.ms_until_due(), Some(u64::MAX - 5));

        clock.advance(1_000_000);
        scheduler.tick();
        assert_eq!(scheduler.display().events, vec![Shown::Paused, word("a")]);
        assert_eq!(scheduler.state(), SchedulerState::Active);
    }

    #[test]
    fn test_wrap_without_shuffle_keeps_order() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b", "c"]), ordered(10, 5)).unwrap();
        scheduler.resume();

        for _ in 0..3 {
            clock.advance(10);
            scheduler.tick();
            clock.advance(5);
            scheduler.tick();
        }

        let session = scheduler.session().unwrap();
        assert_eq!(session.position(), 0);
        assert_eq!(session.displayed_count(), 3);
        assert_eq!(session.sequence(), words(&["a", "b", "c"]));
    }

    #[test]
    fn test_wrap_with_shuffle_keeps_words() {
        let (mut scheduler, clock) = create_test_scheduler();
        let input = words(&["a", "b", "c", "d"]);
        let config = ExerciseConfig {
            shuffle_words: true,
            ..ordered(10, 5)
        };
        scheduler.start(input.clone(), config).unwrap();
        scheduler.resume();

        for _ in 0..10 {
            clock.advance(10);
            scheduler.tick();
            clock.advance(5);
            scheduler.tick();
        }

        let session = scheduler.session().unwrap();
        assert_eq!(session.displayed_count(), 10);
        assert_eq!(session.position(), 2);
        let mut sequence = session.sequence().to_vec();
        sequence.sort();
        assert_eq!(sequence, input);
    }

    #[test]
    fn test_manual_advance_counts_through_wraps() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b", "c"]), ordered(10, 5)).unwrap();

        for _ in 0..7 {
            assert!(scheduler.advance());
        }

        let session = scheduler.session().unwrap();
        assert_eq!(session.displayed_count(), 7);
        assert_eq!(session.position(), 1);
        assert_eq!(scheduler.display().events.last(), Some(&word("b")));
        assert_eq!(scheduler.state(), SchedulerState::Paused);
    }

    #[test]
    fn test_advance_refused_unless_paused() {
        let (mut scheduler, _clock) = create_test_scheduler();
        assert!(!scheduler.advance());

        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();
        assert!(!scheduler.advance());
        assert_eq!(scheduler.session().unwrap().displayed_count(), 0);
    }

    #[test]
    fn test_pause_right_after_resume_cancels() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();
        scheduler.pause();

        assert!(scheduler.next_due_ms().is_none());
        for _ in 0..10 {
            clock.advance(50);
            scheduler.tick();
        }

        assert_eq!(scheduler.session().unwrap().displayed_count(), 0);
        assert_eq!(
            scheduler.display().events,
            vec![Shown::Paused, word("a"), Shown::Paused]
        );
    }

    #[test]
    fn test_pause_during_blank_then_resume_shows_same_word() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();

        clock.advance(10);
        scheduler.tick(); // blank
        scheduler.pause();
        clock.advance(100);
        scheduler.tick();
        assert_eq!(scheduler.session().unwrap().displayed_count(), 0);

        scheduler.resume();
        assert_eq!(scheduler.display().events.last(), Some(&word("a")));
        assert_eq!(scheduler.next_due_ms(), Some(120));
    }

    #[test]
    fn test_resume_is_idempotent() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();
        clock.advance(3);
        scheduler.resume();

        assert_eq!(scheduler.next_due_ms(), Some(10));
        assert_eq!(
            scheduler.display().events,
            vec![Shown::Paused, word("a")]
        );
    }

    #[test]
    fn test_toggle_pause() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler.toggle_pause();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        scheduler.start(words(&["a"]), ordered(10, 5)).unwrap();
        scheduler.toggle_pause();
        assert_eq!(scheduler.state(), SchedulerState::Active);
        scheduler.toggle_pause();
        assert_eq!(scheduler.state(), SchedulerState::Paused);
    }

    #[test]
    fn test_stop_cancels_pending_steps() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();
        scheduler.stop();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.session().is_none());
        assert!(scheduler.next_due_ms().is_none());

        let shown = scheduler.display().events.len();
        clock.advance(1000);
        scheduler.tick();
        assert_eq!(scheduler.display().events.len(), shown);

        scheduler.resume();
        scheduler.pause();
        assert_eq!(scheduler.display().events.len(), shown);
    }

    #[test]
    fn test_zero_speed_flashes_one_step_per_tick() {
        let (mut scheduler, _clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(0, 0)).unwrap();
        scheduler.resume();

        scheduler.tick();
        assert_eq!(scheduler.display().events.last(), Some(&Shown::Blank));
        scheduler.tick();
        assert_eq!(scheduler.display().events.last(), Some(&word("b")));
        assert_eq!(scheduler.session().unwrap().displayed_count(), 1);
    }

    #[test]
    fn test_restart_replaces_session() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.start(words(&["a", "b"]), ordered(10, 5)).unwrap();
        scheduler.resume();
        let first = scheduler.session().unwrap().session_id();

        scheduler.start(words(&["x", "y"]), ordered(10, 5)).unwrap();
        assert_ne!(scheduler.session().unwrap().session_id(), first);
        assert_eq!(scheduler.state(), SchedulerState::Paused);

        clock.advance(100);
        scheduler.tick();
        assert_eq!(scheduler.display().events.last(), Some(&Shown::Paused));
    }
}
