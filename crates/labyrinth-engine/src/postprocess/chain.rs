use crate::gfx::ProgramId;

/// One of the two persistent ping-pong targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PingPong {
    /// Holds the rendered scene when the chain starts.
    A,
    B,
}

impl PingPong {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            PingPong::A => PingPong::B,
            PingPong::B => PingPong::A,
        }
    }
}

/// Where a chain step writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ChainOutput {
    Target(PingPong),
    Window,
}

/// One full-screen draw of the post-process chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChainStep {
    pub program: ProgramId,
    /// Target whose color image is sampled.
    pub read: PingPong,
    pub write: ChainOutput,
}

/// Plans the post-process draws for one frame.
///
/// `enabled` holds the programs of the enabled passes in registration order;
/// when it is empty a single step with `default_program` is planned instead.
/// The first step reads `A`, each following step reads what the previous one
/// wrote, and the last step always writes the window.
pub fn plan_chain(enabled: &[ProgramId], default_program: ProgramId) -> Vec<ChainStep> {
    let fallback = [default_program];
    let programs = if enabled.is_empty() {
        &fallback[..]
    } else {
        enabled
    };

    let last = programs.len() - 1;
    let mut read = PingPong::A;
    let mut write = PingPong::B;

    programs
        .iter()
        .enumerate()
        .map(|(i, &program)| {
            if i > 0 {
                std::mem::swap(&mut read, &mut write);
            }
            let write = if i == last {
                ChainOutput::Window
            } else {
                ChainOutput::Target(write)
            };
            ChainStep {
                program,
                read,
                write,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: ProgramId = ProgramId::from_raw(99);

    fn programs(n: u32) -> Vec<ProgramId> {
        (1..=n).map(ProgramId::from_raw).collect()
    }

    fn check_invariants(steps: &[ChainStep]) {
        for step in steps {
            assert_ne!(step.write, ChainOutput::Target(step.read), "{step:?}");
        }
        assert_eq!(steps.last().map(|s| s.write), Some(ChainOutput::Window));
        for pair in steps.windows(2) {
            assert_eq!(pair[0].write, ChainOutput::Target(pair[1].read));
        }
    }

    // ── fallback ──────────────────────────────────────────────────────────

    #[test]
    fn no_enabled_pass_uses_default_to_window() {
        let steps = plan_chain(&[], DEFAULT);
        assert_eq!(
            steps,
            vec![ChainStep { program: DEFAULT, read: PingPong::A, write: ChainOutput::Window }]
        );
    }

    // ── ping-pong ─────────────────────────────────────────────────────────

    #[test]
    fn single_pass_reads_scene_writes_window() {
        let steps = plan_chain(&programs(1), DEFAULT);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].read, PingPong::A);
        assert_eq!(steps[0].write, ChainOutput::Window);
        check_invariants(&steps);
    }

    #[test]
    fn two_passes() {
        let steps = plan_chain(&programs(2), DEFAULT);
        let io: Vec<_> = steps.iter().map(|s| (s.read, s.write)).collect();
        assert_eq!(
            io,
            vec![
                (PingPong::A, ChainOutput::Target(PingPong::B)),
                (PingPong::B, ChainOutput::Window),
            ]
        );
        check_invariants(&steps);
    }

    #[test]
    fn three_passes() {
        let steps = plan_chain(&programs(3), DEFAULT);
        let io: Vec<_> = steps.iter().map(|s| (s.read, s.write)).collect();
        assert_eq!(
            io,
            vec![
                (PingPong::A, ChainOutput::Target(PingPong::B)),
                (PingPong::B, ChainOutput::Target(PingPong::A)),
                (PingPong::A, ChainOutput::Window),
            ]
        );
        check_invariants(&steps);
    }

    #[test]
    fn step_count_and_order_follow_input() {
        for n in 1..=9 {
            let input = programs(n);
            let steps = plan_chain(&input, DEFAULT);
            assert_eq!(steps.len(), n as usize);
            assert!(steps.iter().map(|s| s.program).eq(input.iter().copied()));
            check_invariants(&steps);
        }
    }
}
