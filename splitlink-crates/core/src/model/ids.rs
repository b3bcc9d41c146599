use crate::storage_key;

storage_key!(
    /// Identifies an [`Event`](super::Event) of an [`Instance`](super::Instance).
    EventId,
    "Event"
);

storage_key!(
    /// Identifies a [`Resource`](super::Resource) of an [`Instance`](super::Instance).
    ResourceId,
    "Resource"
);

storage_key!(EventGroupId, "EventGroup");

storage_key!(ResourceGroupId, "ResourceGroup");

storage_key!(
    /// Identifies a segment of a [`Timetable`](super::Timetable); either a segment of an event
    /// or a cycle segment.
    SegmentId,
    "Segment"
);

storage_key!(
    /// Identifies an assignment node of a [`Timetable`](super::Timetable).
    NodeId,
    "Node"
);
