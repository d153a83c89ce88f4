//! Jobs and the job table
//!
//! A `Job` is one command-line invocation managed as a single unit with a
//! single process group. The `JobTable` owns every live job in insertion
//! order and is the only durable state shared between prompt iterations:
//! the wait coordinator feeds `waitpid` results into [`JobTable::reconcile`]
//! and everything else reads the table synchronously.

use std::fmt;

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use tracing::debug;

/// One invocable program inside a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Argument vector; `argv[0]` is the program name. Non-empty after a
    /// successful parse.
    pub argv: Vec<String>,
    pub stdin_file: Option<String>,
    pub stdout_file: Option<String>,
    pub stderr_file: Option<String>,
}

impl ProcessSpec {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Job identity: background jobs carry a positive number, the at-most-one
/// foreground job carries the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobNumber {
    Foreground,
    Background(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => f.write_str("Running"),
            JobStatus::Stopped => f.write_str("Stopped"),
            JobStatus::Done => f.write_str("Done"),
        }
    }
}

/// One unit of user work: a single process or a two-process pipeline,
/// sharing one process group.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Process-group id, assigned by the launcher before table insertion.
    pub pgid: Pid,
    /// Command text exactly as typed; mutated only by `fg`/`bg` to strip
    /// or append a trailing " &".
    pub command: String,
    pub number: JobNumber,
    pub background: bool,
    pub status: JobStatus,
    pub first: ProcessSpec,
    pub second: Option<ProcessSpec>,
}

impl Job {
    pub fn new(command: String, first: ProcessSpec, second: Option<ProcessSpec>, background: bool) -> Self {
        Job {
            pgid: Pid::from_raw(0),
            command,
            number: JobNumber::Foreground,
            background,
            status: JobStatus::Running,
            first,
            second,
        }
    }

    pub fn is_pipeline(&self) -> bool {
        self.second.is_some()
    }

    /// Ensure the command text ends in " &" (used by `bg`).
    pub fn mark_background_command(&mut self) {
        if !self.command.ends_with(" &") {
            self.command.push_str(" &");
        }
    }

    /// Strip a trailing " &" from the command text (used by `fg`).
    pub fn mark_foreground_command(&mut self) {
        if let Some(stripped) = self.command.strip_suffix(" &") {
            self.command = stripped.to_string();
        }
    }
}

/// Ordered collection of live jobs, keyed by pgid.
///
/// Order is insertion order; lookups are linear scans (the table is small
/// by construction). The table exclusively owns its jobs: removal hands
/// the `Job` back to the caller by value.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Append a job at the tail. Background jobs are assigned the next
    /// free number; foreground jobs keep the sentinel.
    pub fn add(&mut self, mut job: Job) {
        if job.background {
            job.number = JobNumber::Background(self.most_recent_background_number() + 1);
        }
        debug!(pgid = job.pgid.as_raw(), command = %job.command, "job added");
        self.jobs.push(job);
    }

    pub fn find_by_pgid(&self, pgid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.pgid == pgid)
    }

    pub fn find_by_pgid_mut(&mut self, pgid: Pid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.pgid == pgid)
    }

    /// Largest job number over the background jobs, or 0 if none.
    ///
    /// Filters on the background flag, not just the number: a job moved to
    /// the foreground by `fg` keeps its old number but no longer counts.
    pub fn most_recent_background_number(&self) -> u32 {
        self.jobs
            .iter()
            .filter(|j| j.background)
            .filter_map(|j| match j.number {
                JobNumber::Background(n) => Some(n),
                JobNumber::Foreground => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// The job `fg` should resume: the most recently inserted job that has
    /// not completed.
    pub fn next_job_to_fg(&self) -> Option<&Job> {
        self.jobs.iter().rev().find(|j| j.status != JobStatus::Done)
    }

    /// The job `bg` should resume: the most recently inserted stopped
    /// background job.
    pub fn next_job_to_bg(&self) -> Option<&Job> {
        self.jobs
            .iter()
            .rev()
            .find(|j| j.background && j.status == JobStatus::Stopped)
    }

    /// Unlink the job with the given pgid and hand it to the caller.
    pub fn remove_by_pgid(&mut self, pgid: Pid) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.pgid == pgid)?;
        Some(self.jobs.remove(idx))
    }

    /// Drop every completed job.
    pub fn prune_done(&mut self) {
        self.jobs.retain(|j| j.status != JobStatus::Done);
    }

    /// Map one `waitpid` result onto the table. Returns whether the wait
    /// loop made progress; `StillAlive` terminates it.
    ///
    /// A stop by SIGTSTP or SIGSTOP of the foreground job relabels it: the
    /// job becomes a background job and is re-inserted at the tail so it
    /// acquires a fresh background number.
    pub fn reconcile(&mut self, status: WaitStatus) -> bool {
        match status {
            WaitStatus::StillAlive => false,
            WaitStatus::Exited(pid, _) | WaitStatus::Signaled(pid, _, _) => {
                if let Some(job) = self.find_by_pgid_mut(pid) {
                    debug!(pgid = pid.as_raw(), "job completed");
                    job.status = JobStatus::Done;
                }
                true
            }
            WaitStatus::Stopped(pid, signal) => {
                let was_foreground = match self.find_by_pgid_mut(pid) {
                    Some(job) => {
                        debug!(pgid = pid.as_raw(), ?signal, "job stopped");
                        job.status = JobStatus::Stopped;
                        !job.background
                    }
                    None => return true,
                };
                let user_stop = signal == Signal::SIGTSTP || signal == Signal::SIGSTOP;
                if was_foreground && user_stop {
                    // The suspended foreground job joins the background
                    // list with a fresh number at the tail.
                    if let Some(mut job) = self.remove_by_pgid(pid) {
                        job.background = true;
                        self.add(job);
                    }
                }
                true
            }
            // Continued / ptrace events: nothing to record, but the wait
            // call did consume a status change.
            _ => true,
        }
    }

    /// Marker for a job line: `+` for the largest background number in the
    /// table, `-` for everything else.
    fn marker(&self, job: &Job) -> char {
        match job.number {
            JobNumber::Background(n) if n == self.most_recent_background_number() => '+',
            _ => '-',
        }
    }

    fn number_of(job: &Job) -> u32 {
        match job.number {
            JobNumber::Background(n) => n,
            JobNumber::Foreground => 0,
        }
    }

    /// Full status line, used for the `jobs` listing and for Done
    /// notifications: `[n]±\tStatus\t\t\tcommand`.
    pub fn status_line(&self, job: &Job) -> String {
        format!(
            "[{}]{}\t{}\t\t\t{}",
            Self::number_of(job),
            self.marker(job),
            job.status,
            job.command
        )
    }

    /// Short announce line used by `bg`: `[n]±\tcommand`.
    pub fn announce_line(&self, job: &Job) -> String {
        format!("[{}]{}\t{}", Self::number_of(job), self.marker(job), job.command)
    }

    /// Status lines for every completed background job, in table order.
    /// The caller prints these and then calls [`JobTable::prune_done`].
    pub fn completed_report_lines(&self) -> Vec<String> {
        self.jobs
            .iter()
            .filter(|j| j.background && j.status == JobStatus::Done)
            .map(|j| self.status_line(j))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(argv: &[&str]) -> ProcessSpec {
        ProcessSpec {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            ..ProcessSpec::default()
        }
    }

    fn bg_job(pgid: i32, command: &str) -> Job {
        let mut job = Job::new(command.to_string(), spec(&[command]), None, true);
        job.pgid = Pid::from_raw(pgid);
        job
    }

    fn fg_job(pgid: i32, command: &str) -> Job {
        let mut job = Job::new(command.to_string(), spec(&[command]), None, false);
        job.pgid = Pid::from_raw(pgid);
        job
    }

    #[test]
    fn background_numbers_are_monotonic() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.add(bg_job(11, "sleep 60 &"));
        assert_eq!(table.most_recent_background_number(), 2);

        let numbers: Vec<_> = table.iter().map(|j| j.number).collect();
        assert_eq!(
            numbers,
            vec![JobNumber::Background(1), JobNumber::Background(2)]
        );
    }

    #[test]
    fn foreground_jobs_keep_the_sentinel() {
        let mut table = JobTable::new();
        table.add(fg_job(10, "ls"));
        assert_eq!(table.find_by_pgid(Pid::from_raw(10)).unwrap().number, JobNumber::Foreground);
        assert_eq!(table.most_recent_background_number(), 0);
    }

    #[test]
    fn marker_tracks_most_recent_background_job() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.add(bg_job(11, "sleep 60 &"));

        let lines: Vec<_> = table.iter().map(|j| table.status_line(j)).collect();
        assert_eq!(lines[0], "[1]-\tRunning\t\t\tsleep 30 &");
        assert_eq!(lines[1], "[2]+\tRunning\t\t\tsleep 60 &");
    }

    #[test]
    fn reconcile_exit_marks_done() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        assert!(table.reconcile(WaitStatus::Exited(Pid::from_raw(10), 0)));
        assert_eq!(table.find_by_pgid(Pid::from_raw(10)).unwrap().status, JobStatus::Done);
    }

    #[test]
    fn reconcile_signal_death_marks_done() {
        let mut table = JobTable::new();
        table.add(fg_job(10, "sleep 30"));
        assert!(table.reconcile(WaitStatus::Signaled(
            Pid::from_raw(10),
            Signal::SIGINT,
            false
        )));
        assert_eq!(table.find_by_pgid(Pid::from_raw(10)).unwrap().status, JobStatus::Done);
    }

    #[test]
    fn reconcile_still_alive_reports_no_progress() {
        let mut table = JobTable::new();
        assert!(!table.reconcile(WaitStatus::StillAlive));
    }

    #[test]
    fn stopping_the_foreground_job_relabels_it() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.add(fg_job(20, "sleep 60"));

        assert!(table.reconcile(WaitStatus::Stopped(Pid::from_raw(20), Signal::SIGTSTP)));

        let job = table.find_by_pgid(Pid::from_raw(20)).unwrap();
        assert!(job.background);
        assert_eq!(job.status, JobStatus::Stopped);
        assert_eq!(job.number, JobNumber::Background(2));
        // Re-insertion moved it to the tail.
        assert_eq!(table.iter().last().unwrap().pgid, Pid::from_raw(20));
    }

    #[test]
    fn stopping_a_background_job_keeps_its_number() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        assert!(table.reconcile(WaitStatus::Stopped(Pid::from_raw(10), Signal::SIGTSTP)));

        let job = table.find_by_pgid(Pid::from_raw(10)).unwrap();
        assert_eq!(job.number, JobNumber::Background(1));
        assert_eq!(job.status, JobStatus::Stopped);
    }

    #[test]
    fn next_job_to_fg_skips_done_jobs() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.add(bg_job(11, "sleep 60 &"));
        table.reconcile(WaitStatus::Exited(Pid::from_raw(11), 0));

        assert_eq!(table.next_job_to_fg().unwrap().pgid, Pid::from_raw(10));
    }

    #[test]
    fn next_job_to_bg_wants_a_stopped_background_job() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        assert!(table.next_job_to_bg().is_none());

        table.reconcile(WaitStatus::Stopped(Pid::from_raw(10), Signal::SIGSTOP));
        assert_eq!(table.next_job_to_bg().unwrap().pgid, Pid::from_raw(10));
    }

    #[test]
    fn prune_done_removes_completed_jobs() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.add(bg_job(11, "sleep 60 &"));
        table.reconcile(WaitStatus::Exited(Pid::from_raw(10), 0));

        let reports = table.completed_report_lines();
        assert_eq!(reports, vec!["[1]-\tDone\t\t\tsleep 30 &"]);

        table.prune_done();
        assert!(table.find_by_pgid(Pid::from_raw(10)).is_none());
        assert!(table.find_by_pgid(Pid::from_raw(11)).is_some());
    }

    #[test]
    fn done_notification_for_last_job_gets_plus_marker() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 30 &"));
        table.reconcile(WaitStatus::Exited(Pid::from_raw(10), 0));
        assert_eq!(table.completed_report_lines(), vec!["[1]+\tDone\t\t\tsleep 30 &"]);
    }

    #[test]
    fn foregrounded_job_number_does_not_count_as_background() {
        let mut table = JobTable::new();
        table.add(bg_job(10, "sleep 5 &"));
        table.add(bg_job(20, "sleep 60 &"));

        // What fg does to the most recent job: the background flag is
        // cleared, the number stays.
        {
            let job = table.find_by_pgid_mut(Pid::from_raw(20)).unwrap();
            job.mark_foreground_command();
            job.background = false;
        }
        assert_eq!(table.most_recent_background_number(), 1);

        // The remaining background job is now the most recent one, so its
        // completion notice carries the `+` marker.
        table.reconcile(WaitStatus::Exited(Pid::from_raw(10), 0));
        assert_eq!(table.completed_report_lines(), vec!["[1]+\tDone\t\t\tsleep 5 &"]);
    }

    #[test]
    fn command_suffix_round_trip() {
        let mut job = fg_job(10, "sleep 30");
        job.mark_background_command();
        assert_eq!(job.command, "sleep 30 &");
        job.mark_foreground_command();
        assert_eq!(job.command, "sleep 30");

        // Appending is idempotent when the suffix is already present.
        let mut job = bg_job(11, "sleep 60 &");
        job.mark_background_command();
        assert_eq!(job.command, "sleep 60 &");
    }
}
