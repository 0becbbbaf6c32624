use crate::error::StationError;
use crate::observer::SimulationObserver;
use crate::simulation::Simulation;
use crate::time::SimTime;

/// Simulation execution trait.
pub trait Execute<O: SimulationObserver> {
    /// Executes the simulation until some stopping condition is reached and
    /// returns the number of events processed.
    /// The condition is implementation-specific.
    fn execute(self, sim: &mut Simulation<O>) -> Result<u64, StationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    NoEvents,
    Steps(u64),
}

/// Executor is used for simple execution of an entire simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Simulation will end only once there is no available events in the queue.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            end_condition: EndCondition::NoEvents,
        }
    }

    /// Process every event scheduled at or before `time`.
    /// It may terminate early if no events are available.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self {
            end_condition: EndCondition::Time(time),
        }
    }

    /// Simulation will execute exactly this many steps, unless we run out of events.
    #[must_use]
    pub fn steps(steps: u64) -> Self {
        Self {
            end_condition: EndCondition::Steps(steps),
        }
    }

    /// Registers a side effect that is called _after_ each simulation step.
    #[must_use]
    pub fn side_effect<O, F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        O: SimulationObserver,
        F: FnMut(&Simulation<O>),
    {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl<O: SimulationObserver> Execute<O> for Executor {
    fn execute(self, sim: &mut Simulation<O>) -> Result<u64, StationError> {
        run_with(sim, self.end_condition, |_| {})
    }
}

pub struct ExecutorWithSideEffect<F> {
    end_condition: EndCondition,
    side_effect: F,
}

impl<O, F> Execute<O> for ExecutorWithSideEffect<F>
where
    O: SimulationObserver,
    F: FnMut(&Simulation<O>),
{
    fn execute(self, sim: &mut Simulation<O>) -> Result<u64, StationError> {
        run_with(sim, self.end_condition, self.side_effect)
    }
}

fn run_with<O, F>(
    sim: &mut Simulation<O>,
    end_condition: EndCondition,
    mut side_effect: F,
) -> Result<u64, StationError>
where
    O: SimulationObserver,
    F: FnMut(&Simulation<O>),
{
    let mut step_fn = |sim: &mut Simulation<O>| -> Result<bool, StationError> {
        let stepped = sim.step()?;
        if stepped {
            side_effect(sim);
        }
        Ok(stepped)
    };
    match end_condition {
        EndCondition::Time(time) => execute_until(sim, time, &mut step_fn),
        EndCondition::NoEvents => execute_until_empty(sim, &mut step_fn),
        EndCondition::Steps(steps) => execute_steps(sim, steps, &mut step_fn),
    }
}

fn execute_until_empty<O, F>(sim: &mut Simulation<O>, step: &mut F) -> Result<u64, StationError>
where
    F: FnMut(&mut Simulation<O>) -> Result<bool, StationError>,
{
    let mut count = 0;
    while step(sim)? {
        count += 1;
    }
    Ok(count)
}

fn execute_until<O, F>(
    sim: &mut Simulation<O>,
    time: SimTime,
    step: &mut F,
) -> Result<u64, StationError>
where
    O: SimulationObserver,
    F: FnMut(&mut Simulation<O>) -> Result<bool, StationError>,
{
    let mut count = 0;
    while sim.next_event_time().is_some_and(|next| next <= time) {
        step(sim)?;
        count += 1;
    }
    Ok(count)
}

fn execute_steps<O, F>(
    sim: &mut Simulation<O>,
    steps: u64,
    step: &mut F,
) -> Result<u64, StationError>
where
    F: FnMut(&mut Simulation<O>) -> Result<bool, StationError>,
{
    let mut count = 0;
    while count < steps && step(sim)? {
        count += 1;
    }
    Ok(count)
}
