//! Jobs derive requirements from the instance and apply them to a [`SplitForest`].
//!
//! Every job carries a [`JobTag`] naming its family and a priority. Jobs are applied in batches
//! sharing tag and priority, in decreasing order of priority, so that the requirements of
//! heavily weighted constraints are accepted before those of lightly weighted ones. A
//! requirement the forest refuses is simply left out.
mod assigned;
mod avoid_clashes;
mod distribute;
mod domain;
mod link;
mod pack;
mod preassigned;
mod split;
mod spread;

use std::cmp::Reverse;
use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use enum_map::Enum;
use enum_map::EnumMap;
use enumset::EnumSet;
use enumset::EnumSetType;
use log::debug;

use crate::basic_types::Cost;
use crate::basic_types::Partition;
use crate::forest::SplitForest;
use crate::model::ConstraintKind;
use crate::model::EventGroupId;
use crate::model::EventId;
use crate::model::EventSelection;
use crate::model::Instance;
use crate::model::LimitedTimeGroup;
use crate::model::ResourceGroupId;
use crate::model::ResourceId;
use crate::model::TimeGroup;

/// The families of jobs, in increasing order of precedence among jobs of equal priority.
#[derive(Debug, EnumSetType, Hash, PartialOrd, Ord, Enum)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum JobTag {
    /// Events sharing a preassigned resource may not overlap.
    AvoidClashes,
    /// The segments of an event must fit into given sizes.
    Pack,
    /// An event starts at its preassigned time.
    Preassigned,
    /// An event stays within the event it is already assigned to.
    Assigned,
    /// Events of a group run simultaneously.
    Link,
    /// Bounds on the durations and number of segments.
    Split,
    /// Bounds on the number of segments of one duration.
    Distribute,
    /// Bounds on the number of segments of an event group.
    Spread,
    /// Preferred start times.
    Domain,
}

impl Display for JobTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobTag::AvoidClashes => "avoid clashes",
            JobTag::Pack => "pack",
            JobTag::Preassigned => "preassigned",
            JobTag::Assigned => "assigned",
            JobTag::Link => "link",
            JobTag::Split => "split",
            JobTag::Distribute => "distribute",
            JobTag::Spread => "spread",
            JobTag::Domain => "domain",
        };
        write!(f, "{name}")
    }
}

/// The priority of the synthetic pack jobs.
pub const PACK_PRIORITY: Cost = Cost::MAX;
/// The priority of the synthetic preassigned-time jobs.
pub const PREASSIGNED_PRIORITY: Cost = Cost::MAX - 1;
/// The priority of the synthetic assigned-event jobs.
pub const ASSIGNED_PRIORITY: Cost = Cost::MAX - 2;

/// What a job requires of the forest.
#[derive(Clone, Debug)]
pub enum SplitJobKind<'a> {
    AvoidClashes {
        resources: &'a [ResourceId],
        resource_groups: &'a [ResourceGroupId],
    },
    /// Without an event, the partition applies to every event.
    Pack {
        event: Option<EventId>,
        partition: Partition,
    },
    Preassigned {
        event: EventId,
        time: usize,
    },
    Assigned {
        child: EventId,
        parent: EventId,
    },
    Link {
        event_groups: &'a [EventGroupId],
    },
    Split {
        applies_to: &'a EventSelection,
        min_duration: usize,
        max_duration: usize,
        min_amount: usize,
        max_amount: usize,
    },
    Distribute {
        applies_to: &'a EventSelection,
        duration: usize,
        minimum: usize,
        maximum: usize,
    },
    Spread {
        event_groups: &'a [EventGroupId],
        time_spread: &'a [LimitedTimeGroup],
    },
    Domain {
        applies_to: &'a EventSelection,
        domain: &'a Rc<TimeGroup>,
        duration: Option<usize>,
    },
}

impl SplitJobKind<'_> {
    pub fn tag(&self) -> JobTag {
        match self {
            SplitJobKind::AvoidClashes { .. } => JobTag::AvoidClashes,
            SplitJobKind::Pack { .. } => JobTag::Pack,
            SplitJobKind::Preassigned { .. } => JobTag::Preassigned,
            SplitJobKind::Assigned { .. } => JobTag::Assigned,
            SplitJobKind::Link { .. } => JobTag::Link,
            SplitJobKind::Split { .. } => JobTag::Split,
            SplitJobKind::Distribute { .. } => JobTag::Distribute,
            SplitJobKind::Spread { .. } => JobTag::Spread,
            SplitJobKind::Domain { .. } => JobTag::Domain,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SplitJob<'a> {
    pub priority: Cost,
    pub kind: SplitJobKind<'a>,
    /// The constraint the job was derived from, if any.
    pub origin: Option<&'a str>,
}

impl<'a> SplitJob<'a> {
    pub fn tag(&self) -> JobTag {
        self.kind.tag()
    }

    pub fn pack(event: EventId, partition: Partition) -> SplitJob<'a> {
        SplitJob {
            priority: PACK_PRIORITY,
            kind: SplitJobKind::Pack {
                event: Some(event),
                partition,
            },
            origin: None,
        }
    }

    pub fn preassigned(event: EventId, time: usize) -> SplitJob<'a> {
        SplitJob {
            priority: PREASSIGNED_PRIORITY,
            kind: SplitJobKind::Preassigned { event, time },
            origin: None,
        }
    }

    pub fn assigned(child: EventId, parent: EventId) -> SplitJob<'a> {
        SplitJob {
            priority: ASSIGNED_PRIORITY,
            kind: SplitJobKind::Assigned { child, parent },
            origin: None,
        }
    }

    fn apply(&self, instance: &Instance, forest: &mut SplitForest) {
        match &self.kind {
            SplitJobKind::AvoidClashes {
                resources,
                resource_groups,
            } => avoid_clashes::try_avoid_clashes(instance, forest, resources, resource_groups),
            SplitJobKind::Pack { event, partition } => {
                pack::try_pack(instance, forest, *event, partition)
            }
            SplitJobKind::Preassigned { event, time } => {
                preassigned::try_preassigned(forest, *event, *time)
            }
            SplitJobKind::Assigned { child, parent } => {
                assigned::try_assigned(forest, *child, *parent)
            }
            SplitJobKind::Link { event_groups } => link::try_link(instance, forest, event_groups),
            SplitJobKind::Split {
                applies_to,
                min_duration,
                max_duration,
                min_amount,
                max_amount,
            } => split::try_split(
                instance,
                forest,
                applies_to,
                (*min_duration, *max_duration),
                (*min_amount, *max_amount),
            ),
            SplitJobKind::Distribute { .. } => {
                distribute::try_distribute(instance, forest, std::slice::from_ref(self))
            }
            SplitJobKind::Spread {
                event_groups,
                time_spread,
            } => spread::try_spread(instance, forest, event_groups, time_spread),
            SplitJobKind::Domain {
                applies_to,
                domain,
                duration,
            } => domain::try_domain(instance, forest, applies_to, domain, *duration),
        }
    }
}

/// Creates one job for each constraint of `instance` which influences how events are split.
pub fn constraint_jobs(instance: &Instance) -> Vec<SplitJob<'_>> {
    instance
        .constraints()
        .iter()
        .filter_map(|constraint| {
            let kind = match &constraint.kind {
                ConstraintKind::SplitEvents {
                    applies_to,
                    min_duration,
                    max_duration,
                    min_amount,
                    max_amount,
                } => SplitJobKind::Split {
                    applies_to,
                    min_duration: *min_duration,
                    max_duration: *max_duration,
                    min_amount: *min_amount,
                    max_amount: *max_amount,
                },
                ConstraintKind::DistributeSplitEvents {
                    applies_to,
                    duration,
                    minimum,
                    maximum,
                } => SplitJobKind::Distribute {
                    applies_to,
                    duration: *duration,
                    minimum: *minimum,
                    maximum: *maximum,
                },
                ConstraintKind::PreferTimes {
                    applies_to,
                    domain,
                    duration,
                } => SplitJobKind::Domain {
                    applies_to,
                    domain,
                    duration: *duration,
                },
                ConstraintKind::SpreadEvents {
                    event_groups,
                    time_spread,
                } => SplitJobKind::Spread {
                    event_groups,
                    time_spread,
                },
                ConstraintKind::LinkEvents { event_groups } => SplitJobKind::Link { event_groups },
                ConstraintKind::AvoidClashes {
                    resources,
                    resource_groups,
                } => SplitJobKind::AvoidClashes {
                    resources,
                    resource_groups,
                },
                ConstraintKind::AvoidSplitAssignments { .. }
                | ConstraintKind::OrderEvents { .. }
                | ConstraintKind::Other { .. } => return None,
            };
            Some(SplitJob {
                priority: constraint.combined_weight(),
                kind,
                origin: Some(constraint.name.as_str()),
            })
        })
        .collect()
}

/// Sorts `jobs` by decreasing priority, then by decreasing tag.
pub fn sort_jobs(jobs: &mut [SplitJob<'_>]) {
    jobs.sort_by_key(|job| (Reverse(job.priority), Reverse(job.tag())));
}

/// Applies sorted `jobs` batch by batch, leaving out the families in `skipped`.
///
/// Returns the number of jobs applied per family.
pub fn apply_jobs(
    jobs: &[SplitJob<'_>],
    instance: &Instance,
    forest: &mut SplitForest,
    skipped: EnumSet<JobTag>,
) -> EnumMap<JobTag, usize> {
    let mut applied = EnumMap::default();
    for batch in jobs.chunk_by(|first, second| {
        first.tag() == second.tag() && first.priority == second.priority
    }) {
        let tag = batch[0].tag();
        if skipped.contains(tag) {
            debug!("skipping {} {tag} jobs", batch.len());
            continue;
        }
        debug!(
            "applying {} {tag} jobs of priority {}",
            batch.len(),
            batch[0].priority
        );
        applied[tag] += batch.len();

        if tag == JobTag::Distribute {
            distribute::try_distribute(instance, forest, batch);
        } else {
            for job in batch {
                job.apply(instance, forest);
            }
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::combined_cost;
    use crate::containers::StorageKey;
    use crate::model::Constraint;
    use crate::model::Event;
    use crate::model::InstanceBuilder;

    fn constraint(name: &str, required: bool, weight: i64, kind: ConstraintKind) -> Constraint {
        Constraint {
            name: name.to_owned(),
            required,
            weight,
            kind,
        }
    }

    #[test]
    fn jobs_are_derived_from_splitting_constraints_only() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 2));
        let _ = builder
            .add_constraint(constraint(
                "split",
                true,
                1,
                ConstraintKind::SplitEvents {
                    applies_to: EventSelection {
                        events: vec![event],
                        event_groups: Vec::new(),
                    },
                    min_duration: 1,
                    max_duration: 2,
                    min_amount: 1,
                    max_amount: 2,
                },
            ))
            .add_constraint(constraint(
                "order",
                true,
                1,
                ConstraintKind::OrderEvents {
                    first: event,
                    second: event,
                },
            ))
            .add_constraint(constraint(
                "other",
                false,
                3,
                ConstraintKind::Other {
                    family: "assign times".to_owned(),
                },
            ));
        let instance = builder.build();

        let jobs = constraint_jobs(&instance);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].tag(), JobTag::Split);
        assert_eq!(jobs[0].priority, combined_cost(1, 0));
        assert_eq!(jobs[0].origin, Some("split"));
    }

    #[test]
    fn jobs_sort_by_priority_then_tag() {
        let event = EventId::create_from_index(0);
        let groups = Vec::new();
        let mut jobs = vec![
            SplitJob {
                priority: 5,
                kind: SplitJobKind::Link {
                    event_groups: &groups,
                },
                origin: None,
            },
            SplitJob::assigned(event, event),
            SplitJob {
                priority: 5,
                kind: SplitJobKind::Spread {
                    event_groups: &groups,
                    time_spread: &[],
                },
                origin: None,
            },
            SplitJob::pack(event, Partition::unitary(1)),
            SplitJob::preassigned(event, 0),
        ];

        sort_jobs(&mut jobs);

        let tags: Vec<_> = jobs.iter().map(SplitJob::tag).collect();
        assert_eq!(
            tags,
            vec![
                JobTag::Pack,
                JobTag::Preassigned,
                JobTag::Assigned,
                JobTag::Spread,
                JobTag::Link
            ]
        );
    }

    #[test]
    fn skipped_families_are_not_applied() {
        let mut builder = InstanceBuilder::new(10);
        let event = builder.add_event(Event::new("event", 3));
        let instance = builder.build();
        let solution = crate::model::Solution::new(&instance);
        let mut forest = SplitForest::new(&instance, &solution);
        let jobs = vec![
            SplitJob::pack(event, Partition::from_parts([2, 1])),
            SplitJob::preassigned(event, 4),
        ];

        let applied = apply_jobs(&jobs, &instance, &mut forest, JobTag::Preassigned.into());

        assert_eq!(applied[JobTag::Pack], 1);
        assert_eq!(applied[JobTag::Preassigned], 0);
        let class = forest.class(forest.class_of(event));
        assert_eq!(class.max_amount(3), 0);
        assert_eq!(class.domain(3).len(), 10);
    }
}
