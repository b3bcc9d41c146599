//! A parser for the line-based instance format read by the solver.
//!
//! Every line holds one declaration; empty lines and everything after a `#` are ignored. Names
//! cannot contain whitespace and have to be declared before they are used.
//!
//! ```text
//! times 10
//! break 5
//! resource room
//! resourcegroup rooms room
//! event maths 4 resources=room time=2 segments=2,2
//! eventgroup sciences maths physics
//! constraint doubles required 1 distribute maths 2 2 2
//! ```
//!
//! The `resources` list of an event may hold `?` for a resource which is not preassigned. The
//! constraint kinds, after `constraint <name> <required|soft> <weight>`, are:
//!  - `split <selection> <min duration> <max duration> <min amount> <max amount>`,
//!  - `distribute <selection> <duration> <minimum> <maximum>`,
//!  - `prefer <selection> <times> [<duration>]`,
//!  - `spread <event groups> <times>:<minimum>:<maximum>...`,
//!  - `link <event groups>`,
//!  - `avoidclashes <resources and resource groups>`,
//!  - `avoidsplit <event groups>`,
//!  - `order <first event> <second event>`.
//!
//! Any other kind is kept as a constraint without influence on the splits. Selections and name
//! lists are comma-separated; a selection may name events and event groups. Times are
//! comma-separated times or ranges, such as `0-4,7`.
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::rc::Rc;
use std::str::SplitWhitespace;

use fnv::FnvHashMap;
use splitlink_core::model::Constraint;
use splitlink_core::model::ConstraintKind;
use splitlink_core::model::Event;
use splitlink_core::model::EventGroupId;
use splitlink_core::model::EventId;
use splitlink_core::model::EventSelection;
use splitlink_core::model::Instance;
use splitlink_core::model::InstanceBuilder;
use splitlink_core::model::LimitedTimeGroup;
use splitlink_core::model::ResourceGroupId;
use splitlink_core::model::ResourceId;
use splitlink_core::model::TimeGroup;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("failed to read the instance")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {error}")]
    Line { line: usize, error: LineError },
    #[error("the instance does not declare its number of times")]
    MissingTimes,
}

/// What is wrong with a single line of an instance.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("unknown declaration '{0}'")]
    UnknownDeclaration(String),
    #[error("expected {0}")]
    Missing(&'static str),
    #[error("unexpected '{0}'")]
    Unexpected(String),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("'{0}' is not a list of times")]
    InvalidTimes(String),
    #[error("time {time} lies outside the {time_count} times")]
    TimeOutOfRange { time: usize, time_count: usize },
    #[error("the number of times is declared twice")]
    DuplicateTimes,
    #[error("the number of times has to be declared first")]
    TimesNotDeclared,
    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },
    #[error("'{0}' is declared twice")]
    DuplicateName(String),
    #[error("events must last at least one time")]
    ZeroDuration,
    #[error("the segments add up to {total}, but the event lasts {duration}")]
    SegmentsMismatch { total: usize, duration: usize },
}

/// Reads an instance from `source`.
pub fn parse_instance(source: impl Read) -> Result<Instance, InstanceError> {
    let reader = BufReader::new(source);
    let mut parser = InstanceParser::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        parser
            .parse_line(&line)
            .map_err(|error| InstanceError::Line {
                line: index + 1,
                error,
            })?;
    }
    parser
        .builder
        .map(InstanceBuilder::build)
        .ok_or(InstanceError::MissingTimes)
}

#[derive(Default)]
struct InstanceParser {
    builder: Option<InstanceBuilder>,
    events: FnvHashMap<String, EventId>,
    resources: FnvHashMap<String, ResourceId>,
    event_groups: FnvHashMap<String, EventGroupId>,
    resource_groups: FnvHashMap<String, ResourceGroupId>,
}

impl InstanceParser {
    fn parse_line(&mut self, line: &str) -> Result<(), LineError> {
        let content = line.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();
        let Some(declaration) = tokens.next() else {
            return Ok(());
        };

        match declaration {
            "times" => {
                if self.builder.is_some() {
                    return Err(LineError::DuplicateTimes);
                }
                let time_count = parse_number(next(&mut tokens, "the number of times")?)?;
                self.builder = Some(InstanceBuilder::new(time_count));
            }
            "break" => {
                let time = self.parse_time(next(&mut tokens, "a time")?)?;
                let _ = self.builder()?.add_cycle_break(time);
            }
            "resource" => {
                let name = next(&mut tokens, "a resource name")?;
                check_new(&self.resources, name)?;
                let resource = self.builder()?.add_resource(name);
                let _ = self.resources.insert(name.to_owned(), resource);
            }
            "resourcegroup" => {
                let name = next(&mut tokens, "a resource group name")?;
                check_new(&self.resource_groups, name)?;
                let members = tokens
                    .by_ref()
                    .map(|member| lookup(&self.resources, "resource", member))
                    .collect::<Result<Vec<_>, _>>()?;
                let group = self.builder()?.add_resource_group(name, members);
                let _ = self.resource_groups.insert(name.to_owned(), group);
            }
            "event" => self.parse_event(&mut tokens)?,
            "eventgroup" => {
                let name = next(&mut tokens, "an event group name")?;
                check_new(&self.event_groups, name)?;
                let members = tokens
                    .by_ref()
                    .map(|member| lookup(&self.events, "event", member))
                    .collect::<Result<Vec<_>, _>>()?;
                let group = self.builder()?.add_event_group(name, members);
                let _ = self.event_groups.insert(name.to_owned(), group);
            }
            "constraint" => self.parse_constraint(&mut tokens)?,
            other => return Err(LineError::UnknownDeclaration(other.to_owned())),
        }

        match tokens.next() {
            Some(token) => Err(LineError::Unexpected(token.to_owned())),
            None => Ok(()),
        }
    }

    fn builder(&mut self) -> Result<&mut InstanceBuilder, LineError> {
        self.builder.as_mut().ok_or(LineError::TimesNotDeclared)
    }

    fn time_count(&self) -> Result<usize, LineError> {
        self.builder
            .as_ref()
            .map(InstanceBuilder::time_count)
            .ok_or(LineError::TimesNotDeclared)
    }

    fn parse_time(&self, token: &str) -> Result<usize, LineError> {
        let time = parse_number(token)?;
        let time_count = self.time_count()?;
        if time >= time_count {
            return Err(LineError::TimeOutOfRange { time, time_count });
        }
        Ok(time)
    }

    fn parse_event(&mut self, tokens: &mut SplitWhitespace<'_>) -> Result<(), LineError> {
        let name = next(tokens, "an event name")?;
        check_new(&self.events, name)?;
        let duration = parse_number(next(tokens, "a duration")?)?;
        if duration == 0 {
            return Err(LineError::ZeroDuration);
        }

        let mut event = Event::new(name, duration);
        for option in tokens.by_ref() {
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| LineError::Unexpected(option.to_owned()))?;
            match key {
                "time" => event = event.with_preassigned_time(self.parse_time(value)?),
                "resources" => {
                    for resource in value.split(',') {
                        let preassigned = match resource {
                            "?" => None,
                            resource => Some(lookup(&self.resources, "resource", resource)?),
                        };
                        event = event.with_resource(preassigned);
                    }
                }
                "segments" => {
                    let durations = value
                        .split(',')
                        .map(parse_number)
                        .collect::<Result<Vec<_>, _>>()?;
                    let total = durations.iter().sum();
                    if total != duration || durations.contains(&0) {
                        return Err(LineError::SegmentsMismatch { total, duration });
                    }
                    event = event.with_initial_segments(durations);
                }
                _ => return Err(LineError::Unexpected(option.to_owned())),
            }
        }

        let id = self.builder()?.add_event(event);
        let _ = self.events.insert(name.to_owned(), id);
        Ok(())
    }

    fn parse_constraint(&mut self, tokens: &mut SplitWhitespace<'_>) -> Result<(), LineError> {
        let name = next(tokens, "a constraint name")?;
        let required = match next(tokens, "'required' or 'soft'")? {
            "required" => true,
            "soft" => false,
            other => return Err(LineError::Unexpected(other.to_owned())),
        };
        let weight_token = next(tokens, "a weight")?;
        let weight = weight_token
            .parse::<i64>()
            .map_err(|_| LineError::InvalidNumber(weight_token.to_owned()))?;

        let kind = match next(tokens, "a constraint kind")? {
            "split" => ConstraintKind::SplitEvents {
                applies_to: self.parse_selection(next(tokens, "an event selection")?)?,
                min_duration: parse_number(next(tokens, "a minimum duration")?)?,
                max_duration: parse_number(next(tokens, "a maximum duration")?)?,
                min_amount: parse_number(next(tokens, "a minimum amount")?)?,
                max_amount: parse_number(next(tokens, "a maximum amount")?)?,
            },
            "distribute" => ConstraintKind::DistributeSplitEvents {
                applies_to: self.parse_selection(next(tokens, "an event selection")?)?,
                duration: parse_number(next(tokens, "a duration")?)?,
                minimum: parse_number(next(tokens, "a minimum")?)?,
                maximum: parse_number(next(tokens, "a maximum")?)?,
            },
            "prefer" => ConstraintKind::PreferTimes {
                applies_to: self.parse_selection(next(tokens, "an event selection")?)?,
                domain: Rc::new(self.parse_times(next(tokens, "a list of times")?)?),
                duration: tokens.next().map(parse_number).transpose()?,
            },
            "spread" => {
                let event_groups = self.parse_event_groups(next(tokens, "event groups")?)?;
                let time_spread = tokens
                    .by_ref()
                    .map(|token| self.parse_limited_time_group(token))
                    .collect::<Result<Vec<_>, _>>()?;
                ConstraintKind::SpreadEvents {
                    event_groups,
                    time_spread,
                }
            }
            "link" => ConstraintKind::LinkEvents {
                event_groups: self.parse_event_groups(next(tokens, "event groups")?)?,
            },
            "avoidclashes" => {
                let mut resources = Vec::new();
                let mut resource_groups = Vec::new();
                for name in next(tokens, "resources")?.split(',') {
                    if let Some(&group) = self.resource_groups.get(name) {
                        resource_groups.push(group);
                    } else {
                        resources.push(lookup(&self.resources, "resource", name)?);
                    }
                }
                ConstraintKind::AvoidClashes {
                    resources,
                    resource_groups,
                }
            }
            "avoidsplit" => ConstraintKind::AvoidSplitAssignments {
                event_groups: self.parse_event_groups(next(tokens, "event groups")?)?,
            },
            "order" => ConstraintKind::OrderEvents {
                first: lookup(&self.events, "event", next(tokens, "an event")?)?,
                second: lookup(&self.events, "event", next(tokens, "an event")?)?,
            },
            family => {
                // Arguments of other families are not interpreted.
                let _ = tokens.by_ref().count();
                ConstraintKind::Other {
                    family: family.to_owned(),
                }
            }
        };

        let _ = self.builder()?.add_constraint(Constraint {
            name: name.to_owned(),
            required,
            weight,
            kind,
        });
        Ok(())
    }

    fn parse_selection(&self, token: &str) -> Result<EventSelection, LineError> {
        let mut selection = EventSelection::default();
        for name in token.split(',') {
            if let Some(&group) = self.event_groups.get(name) {
                selection.event_groups.push(group);
            } else {
                selection.events.push(lookup(&self.events, "event", name)?);
            }
        }
        Ok(selection)
    }

    fn parse_event_groups(&self, token: &str) -> Result<Vec<EventGroupId>, LineError> {
        token
            .split(',')
            .map(|name| lookup(&self.event_groups, "event group", name))
            .collect()
    }

    fn parse_times(&self, token: &str) -> Result<TimeGroup, LineError> {
        let mut times = Vec::new();
        for range in token.split(',') {
            let (first, last) = match range.split_once('-') {
                Some((first, last)) => (first, last),
                None => (range, range),
            };
            let first = self
                .parse_time(first)
                .map_err(|_| LineError::InvalidTimes(token.to_owned()))?;
            let last = self
                .parse_time(last)
                .map_err(|_| LineError::InvalidTimes(token.to_owned()))?;
            times.extend(first..=last);
        }
        Ok(TimeGroup::new(times))
    }

    fn parse_limited_time_group(&self, token: &str) -> Result<LimitedTimeGroup, LineError> {
        let mut fields = token.split(':');
        let times = fields.next().unwrap_or_default();
        let (Some(minimum), Some(maximum), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(LineError::Unexpected(token.to_owned()));
        };
        Ok(LimitedTimeGroup {
            time_group: Rc::new(self.parse_times(times)?),
            minimum: parse_number(minimum)?,
            maximum: parse_number(maximum)?,
        })
    }
}

fn next<'a>(tokens: &mut SplitWhitespace<'a>, expected: &'static str) -> Result<&'a str, LineError> {
    tokens.next().ok_or(LineError::Missing(expected))
}

fn parse_number(token: &str) -> Result<usize, LineError> {
    token
        .parse()
        .map_err(|_| LineError::InvalidNumber(token.to_owned()))
}

fn check_new<Id>(names: &FnvHashMap<String, Id>, name: &str) -> Result<(), LineError> {
    if names.contains_key(name) {
        return Err(LineError::DuplicateName(name.to_owned()));
    }
    Ok(())
}

fn lookup<Id: Copy>(
    names: &FnvHashMap<String, Id>,
    kind: &'static str,
    name: &str,
) -> Result<Id, LineError> {
    names.get(name).copied().ok_or_else(|| LineError::UnknownName {
        kind,
        name: name.to_owned(),
    })
}
