//! Graph algorithms over topic relationships.
//!
//! The relationship edges stored on topics form an undirected graph (the
//! store keeps them symmetric). These functions take the graph exactly as
//! stored - no connectivity or acyclicity assumptions - and every traversal
//! carries a visited set, so cycles terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use garden_world::{SquareId, Topic, TopicId, TopicStore};

/// Default cap for [`suggested_topics`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// All topics reachable from `start` within `depth` hops, excluding `start`
/// itself. Deduplicated; `depth` 0 yields nothing.
pub fn related_topics(store: &TopicStore, start: TopicId, depth: usize) -> Vec<&Topic> {
    let mut visited = HashSet::from([start]);
    let mut result = Vec::new();
    let mut frontier = vec![start];

    for _ in 0..depth {
        let mut next = Vec::new();
        for id in frontier {
            let Some(topic) = store.topic(id) else {
                continue;
            };
            for &related in &topic.related_topic_ids {
                if visited.insert(related) {
                    if let Some(found) = store.topic(related) {
                        result.push(found);
                        next.push(related);
                    }
                }
            }
        }
        frontier = next;
    }

    result
}

/// Shortest path between two topics via BFS, inclusive of both endpoints.
///
/// `from == to` yields the single-element path when the topic exists.
/// Unreachable targets - or a graph whose stored edges point at missing
/// topics - yield an empty path, never an error.
pub fn find_path(store: &TopicStore, from: TopicId, to: TopicId) -> Vec<&Topic> {
    if from == to {
        return store.topic(from).into_iter().collect();
    }
    if store.topic(from).is_none() || store.topic(to).is_none() {
        return Vec::new();
    }

    let mut visited = HashSet::from([from]);
    let mut parents: HashMap<TopicId, TopicId> = HashMap::new();
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        let Some(topic) = store.topic(current) else {
            continue;
        };

        for &related in &topic.related_topic_ids {
            if !visited.insert(related) {
                continue;
            }
            parents.insert(related, current);

            if related == to {
                return reconstruct_path(store, &parents, from, to);
            }
            queue.push_back(related);
        }
    }

    Vec::new()
}

fn reconstruct_path<'a>(
    store: &'a TopicStore,
    parents: &HashMap<TopicId, TopicId>,
    from: TopicId,
    to: TopicId,
) -> Vec<&'a Topic> {
    let mut ids = vec![to];
    let mut current = to;
    while current != from {
        match parents.get(&current) {
            Some(&parent) => {
                ids.push(parent);
                current = parent;
            }
            // Broken parent chain: treat as no path.
            None => return Vec::new(),
        }
    }
    ids.reverse();

    let mut path = Vec::with_capacity(ids.len());
    for id in ids {
        match store.topic(id) {
            Some(topic) => path.push(topic),
            // A node on the path is missing from the store: broken graph.
            None => return Vec::new(),
        }
    }
    path
}

/// Topics with no relationships at all.
pub fn isolated_topics(store: &TopicStore) -> Vec<&Topic> {
    store
        .all_topics()
        .filter(|t| t.related_topic_ids.is_empty())
        .collect()
}

/// The topic with the most relationship edges.
///
/// Ties break toward the first-encountered topic; the store iterates in
/// insertion order, so the result is deterministic.
pub fn most_connected_topic(store: &TopicStore) -> Option<&Topic> {
    let mut best: Option<&Topic> = None;
    for topic in store.all_topics() {
        let degree = topic.related_topic_ids.len();
        if best.map_or(true, |b| degree > b.related_topic_ids.len()) {
            best = Some(topic);
        }
    }
    best
}

/// Topics worth exploring next from `current`: the depth-2 neighborhood,
/// least-engaged first, truncated to `limit`.
pub fn suggested_topics(store: &TopicStore, current: TopicId, limit: usize) -> Vec<&Topic> {
    let mut related = related_topics(store, current, 2);
    related.sort_by_key(|t| t.engagement_score);
    related.truncate(limit);
    related
}

/// Topics whose relationship set touches more than one distinct subject
/// square (counting the topic's own square) - the bridges between zones.
pub fn bridge_topics(store: &TopicStore) -> Vec<&Topic> {
    store
        .all_topics()
        .filter(|topic| {
            let mut squares: HashSet<&SquareId> = HashSet::new();
            squares.insert(&topic.subject_square);
            for related in &topic.related_topic_ids {
                if let Some(other) = store.topic(*related) {
                    squares.insert(&other.subject_square);
                }
            }
            squares.len() > 1
        })
        .collect()
}
