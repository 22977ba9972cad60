//! Sorted-set (ZSET) commands
//!
//! Two layers live here. The free functions are pure marshalling: each one
//! builds the `Command` for a single Redis primitive (ZADD, ZRANGE, ...).
//! [`SortedSetCommands`] is the convenience API on top, blanket-implemented
//! for every [`Transport`]: it composes primitives where needed (pop = range
//! read + remove) and demarshals replies into plain Rust types.

use crate::connection::Transport;
use crate::error::{Result, ZedisError};
use crate::pipeline::{all_ints_successful, Pipeline};
use crate::score::{lexical_score, score_arg};

use super::Command;

/// ZADD with a single score/member pair
pub fn zadd(key: &str, score: f64, member: &str) -> Result<Command> {
    Ok(Command::new("ZADD").arg(key).arg(score_arg(score)?).arg(member))
}

/// ZADD with multiple score/member pairs in one command
pub fn zadd_multi(key: &str, pairs: &[(&str, f64)]) -> Result<Command> {
    if pairs.is_empty() {
        return Err(ZedisError::InvalidArgument(
            "ZADD requires at least one score/member pair".to_string(),
        ));
    }
    let mut cmd = Command::new("ZADD").arg(key);
    for (member, score) in pairs {
        cmd = cmd.arg(score_arg(*score)?).arg(*member);
    }
    Ok(cmd)
}

/// ZREM a single member
pub fn zrem(key: &str, member: &str) -> Command {
    Command::new("ZREM").arg(key).arg(member)
}

/// ZRANGE by rank, ascending
pub fn zrange(key: &str, start: i64, stop: i64, with_scores: bool) -> Command {
    let cmd = Command::new("ZRANGE").arg(key).arg(start).arg(stop);
    if with_scores {
        cmd.arg("WITHSCORES")
    } else {
        cmd
    }
}

/// ZREVRANGE by rank, descending
pub fn zrevrange(key: &str, start: i64, stop: i64, with_scores: bool) -> Command {
    let cmd = Command::new("ZREVRANGE").arg(key).arg(start).arg(stop);
    if with_scores {
        cmd.arg("WITHSCORES")
    } else {
        cmd
    }
}

/// ZRANGEBYSCORE with optional WITHSCORES and LIMIT offset count
pub fn zrangebyscore(
    key: &str,
    min: f64,
    max: f64,
    with_scores: bool,
    limit: Option<(i64, i64)>,
) -> Result<Command> {
    let mut cmd = Command::new("ZRANGEBYSCORE")
        .arg(key)
        .arg(score_arg(min)?)
        .arg(score_arg(max)?);
    if with_scores {
        cmd = cmd.arg("WITHSCORES");
    }
    if let Some((offset, count)) = limit {
        cmd = cmd.arg("LIMIT").arg(offset).arg(count);
    }
    Ok(cmd)
}

/// ZREVRANGEBYSCORE: note the Redis argument order is `max` before `min`
pub fn zrevrangebyscore(
    key: &str,
    max: f64,
    min: f64,
    with_scores: bool,
    limit: Option<(i64, i64)>,
) -> Result<Command> {
    let mut cmd = Command::new("ZREVRANGEBYSCORE")
        .arg(key)
        .arg(score_arg(max)?)
        .arg(score_arg(min)?);
    if with_scores {
        cmd = cmd.arg("WITHSCORES");
    }
    if let Some((offset, count)) = limit {
        cmd = cmd.arg("LIMIT").arg(offset).arg(count);
    }
    Ok(cmd)
}

pub fn zrank(key: &str, member: &str) -> Command {
    Command::new("ZRANK").arg(key).arg(member)
}

pub fn zrevrank(key: &str, member: &str) -> Command {
    Command::new("ZREVRANK").arg(key).arg(member)
}

pub fn zscore(key: &str, member: &str) -> Command {
    Command::new("ZSCORE").arg(key).arg(member)
}

pub fn zcard(key: &str) -> Command {
    Command::new("ZCARD").arg(key)
}

pub fn zcount(key: &str, min: f64, max: f64) -> Result<Command> {
    Ok(Command::new("ZCOUNT")
        .arg(key)
        .arg(score_arg(min)?)
        .arg(score_arg(max)?))
}

pub fn zincrby(key: &str, increment: f64, member: &str) -> Result<Command> {
    Ok(Command::new("ZINCRBY")
        .arg(key)
        .arg(score_arg(increment)?)
        .arg(member))
}

pub fn zremrangebyrank(key: &str, start: i64, stop: i64) -> Command {
    Command::new("ZREMRANGEBYRANK").arg(key).arg(start).arg(stop)
}

pub fn zremrangebyscore(key: &str, min: f64, max: f64) -> Result<Command> {
    Ok(Command::new("ZREMRANGEBYSCORE")
        .arg(key)
        .arg(score_arg(min)?)
        .arg(score_arg(max)?))
}

/// ZUNIONSTORE dest numkeys key [key ...]
pub fn zunionstore(dest: &str, keys: &[&str]) -> Result<Command> {
    store_command("ZUNIONSTORE", dest, keys)
}

/// ZINTERSTORE dest numkeys key [key ...]
pub fn zinterstore(dest: &str, keys: &[&str]) -> Result<Command> {
    store_command("ZINTERSTORE", dest, keys)
}

fn store_command(name: &str, dest: &str, keys: &[&str]) -> Result<Command> {
    if keys.is_empty() {
        return Err(ZedisError::InvalidArgument(format!(
            "{} requires at least one source key",
            name
        )));
    }
    let mut cmd = Command::new(name).arg(dest).arg(keys.len());
    for key in keys {
        cmd = cmd.arg(*key);
    }
    Ok(cmd)
}

/// High-level sorted-set operations over any transport
pub trait SortedSetCommands: Transport {
    /// Add a member with an explicit score. Returns true when the member was
    /// newly inserted (an existing member gets its score updated and returns
    /// false).
    fn add_item(&mut self, key: &str, member: &str, score: f64) -> Result<bool> {
        Ok(self.request(zadd(key, score, member)?)?.into_int()? == 1)
    }

    /// Add a member scored by its own leading bytes, approximating
    /// lexicographic order within the set
    fn add_item_lexical(&mut self, key: &str, member: &str) -> Result<bool> {
        self.add_item(key, member, lexical_score(member))
    }

    /// Add many members at the same score, one pipelined ZADD per member.
    /// Succeeds only when every reply is a non-negative integer.
    fn add_range(&mut self, key: &str, members: &[&str], score: f64) -> Result<bool> {
        if members.is_empty() {
            return Err(ZedisError::InvalidArgument(
                "no members to add".to_string(),
            ));
        }
        let mut pipeline = Pipeline::new();
        for member in members {
            pipeline.cmd(zadd(key, score, member)?);
        }
        let replies = pipeline.query(self)?;
        Ok(all_ints_successful(&replies))
    }

    /// Add members with individual scores in a single multi-pair ZADD.
    /// Returns the number of newly inserted members.
    fn add_range_with_scores(&mut self, key: &str, pairs: &[(&str, f64)]) -> Result<i64> {
        self.request(zadd_multi(key, pairs)?)?.into_int()
    }

    /// Remove a member. Returns true when the member existed.
    fn remove_item(&mut self, key: &str, member: &str) -> Result<bool> {
        Ok(self.request(zrem(key, member))?.into_int()? == 1)
    }

    /// Read and remove the lowest-scored member.
    ///
    /// Composed of ZRANGE and ZREM, so not atomic: a concurrent client can
    /// observe or remove the member between the two calls.
    fn pop_item_with_lowest_score(&mut self, key: &str) -> Result<Option<String>> {
        let members = self.request(zrange(key, 0, 0, false))?.into_string_vec()?;
        self.pop_member(key, members)
    }

    /// Read and remove the highest-scored member. Same non-atomicity caveat
    /// as [`pop_item_with_lowest_score`](Self::pop_item_with_lowest_score).
    fn pop_item_with_highest_score(&mut self, key: &str) -> Result<Option<String>> {
        let members = self
            .request(zrevrange(key, 0, 0, false))?
            .into_string_vec()?;
        self.pop_member(key, members)
    }

    #[doc(hidden)]
    fn pop_member(&mut self, key: &str, members: Vec<String>) -> Result<Option<String>> {
        match members.into_iter().next() {
            None => Ok(None),
            Some(member) => {
                self.request(zrem(key, &member))?.into_int()?;
                Ok(Some(member))
            }
        }
    }

    /// Whether the member is present (ZRANK returns a rank)
    fn contains_item(&mut self, key: &str, member: &str) -> Result<bool> {
        Ok(self
            .request(zrank(key, member))?
            .into_optional_int()?
            .is_some())
    }

    /// Increment a member's score, creating it at `increment` when absent.
    /// Returns the new score.
    fn increment_item(&mut self, key: &str, member: &str, increment: f64) -> Result<f64> {
        self.request(zincrby(key, increment, member)?)?.into_double()
    }

    /// Ascending rank of a member, None when absent
    fn item_rank(&mut self, key: &str, member: &str) -> Result<Option<i64>> {
        self.request(zrank(key, member))?.into_optional_int()
    }

    /// Descending rank of a member, None when absent
    fn item_rank_desc(&mut self, key: &str, member: &str) -> Result<Option<i64>> {
        self.request(zrevrank(key, member))?.into_optional_int()
    }

    /// All members in score order
    fn all_items(&mut self, key: &str) -> Result<Vec<String>> {
        self.range(key, 0, -1)
    }

    /// All members in reverse score order
    fn all_items_desc(&mut self, key: &str) -> Result<Vec<String>> {
        self.range_desc(key, 0, -1)
    }

    /// Members between two ranks, ascending (both bounds inclusive, negative
    /// ranks count from the end as in Redis)
    fn range(&mut self, key: &str, from_rank: i64, to_rank: i64) -> Result<Vec<String>> {
        self.request(zrange(key, from_rank, to_rank, false))?
            .into_string_vec()
    }

    /// Members between two ranks, descending
    fn range_desc(&mut self, key: &str, from_rank: i64, to_rank: i64) -> Result<Vec<String>> {
        self.request(zrevrange(key, from_rank, to_rank, false))?
            .into_string_vec()
    }

    /// All members with their scores, in score order
    fn all_with_scores(&mut self, key: &str) -> Result<Vec<(String, f64)>> {
        self.range_with_scores(key, 0, -1)
    }

    /// Members with scores between two ranks, ascending
    fn range_with_scores(
        &mut self,
        key: &str,
        from_rank: i64,
        to_rank: i64,
    ) -> Result<Vec<(String, f64)>> {
        self.request(zrange(key, from_rank, to_rank, true))?
            .into_score_pairs()
    }

    /// Members with scores between two ranks, descending
    fn range_with_scores_desc(
        &mut self,
        key: &str,
        from_rank: i64,
        to_rank: i64,
    ) -> Result<Vec<(String, f64)>> {
        self.request(zrevrange(key, from_rank, to_rank, true))?
            .into_score_pairs()
    }

    /// Members with scores in `[min, max]`, lowest first.
    /// `limit` is `(offset, count)`, applied after the score filter.
    fn range_by_score(
        &mut self,
        key: &str,
        min: f64,
        max: f64,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<String>> {
        self.request(zrangebyscore(key, min, max, false, limit)?)?
            .into_string_vec()
    }

    /// Like [`range_by_score`](Self::range_by_score), scores included
    fn range_by_score_with_scores(
        &mut self,
        key: &str,
        min: f64,
        max: f64,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<(String, f64)>> {
        self.request(zrangebyscore(key, min, max, true, limit)?)?
            .into_score_pairs()
    }

    /// Members with scores in `[to_score, from_score]`, highest first:
    /// `from_score` is the upper bound of the scan
    fn range_by_score_desc(
        &mut self,
        key: &str,
        from_score: f64,
        to_score: f64,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<String>> {
        self.request(zrevrangebyscore(key, from_score, to_score, false, limit)?)?
            .into_string_vec()
    }

    /// Like [`range_by_score_desc`](Self::range_by_score_desc), scores included
    fn range_by_score_desc_with_scores(
        &mut self,
        key: &str,
        from_score: f64,
        to_score: f64,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<(String, f64)>> {
        self.request(zrevrangebyscore(key, from_score, to_score, true, limit)?)?
            .into_score_pairs()
    }

    /// Score-range read with string bounds mapped through the lexical score
    /// packing, lowest first
    fn range_by_lexical_score(
        &mut self,
        key: &str,
        from: &str,
        to: &str,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<String>> {
        self.range_by_score(key, lexical_score(from), lexical_score(to), limit)
    }

    /// Like [`range_by_lexical_score`](Self::range_by_lexical_score), scores
    /// included
    fn range_by_lexical_score_with_scores(
        &mut self,
        key: &str,
        from: &str,
        to: &str,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<(String, f64)>> {
        self.range_by_score_with_scores(key, lexical_score(from), lexical_score(to), limit)
    }

    /// Remove members between two ranks; returns how many were removed
    fn remove_range_by_rank(&mut self, key: &str, from_rank: i64, to_rank: i64) -> Result<i64> {
        self.request(zremrangebyrank(key, from_rank, to_rank))?
            .into_int()
    }

    /// Remove members with scores in `[min, max]`; returns how many were
    /// removed
    fn remove_range_by_score(&mut self, key: &str, min: f64, max: f64) -> Result<i64> {
        self.request(zremrangebyscore(key, min, max)?)?.into_int()
    }

    /// Cardinality of the set (ZCARD)
    fn set_len(&mut self, key: &str) -> Result<i64> {
        self.request(zcard(key))?.into_int()
    }

    /// Number of members with scores in `[min, max]` (ZCOUNT)
    fn count_in_range(&mut self, key: &str, min: f64, max: f64) -> Result<i64> {
        self.request(zcount(key, min, max)?)?.into_int()
    }

    /// ZCOUNT with string bounds mapped through the lexical score packing
    fn count_in_lexical_range(&mut self, key: &str, from: &str, to: &str) -> Result<i64> {
        self.count_in_range(key, lexical_score(from), lexical_score(to))
    }

    /// A member's score, None when absent
    fn item_score(&mut self, key: &str, member: &str) -> Result<Option<f64>> {
        self.request(zscore(key, member))?.into_optional_double()
    }

    /// Store the union of `keys` into `dest`; returns the result cardinality
    fn store_union(&mut self, dest: &str, keys: &[&str]) -> Result<i64> {
        self.request(zunionstore(dest, keys)?)?.into_int()
    }

    /// Store the intersection of `keys` into `dest`; returns the result
    /// cardinality
    fn store_intersect(&mut self, dest: &str, keys: &[&str]) -> Result<i64> {
        self.request(zinterstore(dest, keys)?)?.into_int()
    }
}

impl<T: Transport + ?Sized> SortedSetCommands for T {}
