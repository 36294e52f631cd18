//! Fluent builder methods for Queryable.

use crate::ast::{
    CombineEntry, CombineType, Condition, Connector, Field, JoinEntry, JoinType, OutputType,
    PagingFilter, Queryable, SortEntry, TreeDirection, TreeInfo,
};

impl Queryable {
    /// Add a condition joined with AND.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a condition joined with OR.
    pub fn or_filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition.or());
        self
    }

    /// Select specific fields.
    pub fn select<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.fields.extend(fields);
        self
    }

    /// Select properties of the target entity by name.
    pub fn columns<I, S>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entity = self.entity().unwrap_or_default().to_string();
        let fields: Vec<Field> = properties
            .into_iter()
            .map(|p| Field::property(entity.clone(), p.as_ref()))
            .collect();
        self.select(fields)
    }

    pub fn sort_asc(mut self, field: Field) -> Self {
        self.sorts.push(SortEntry { field, desc: false });
        self
    }

    pub fn sort_desc(mut self, field: Field) -> Self {
        self.sorts.push(SortEntry { field, desc: true });
        self
    }

    pub fn join(
        mut self,
        join_type: JoinType,
        target: Queryable,
        connection: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.joins.push(JoinEntry {
            join_type,
            target,
            join_ordinal: 0,
            connection: connection.into_iter().collect(),
        });
        self
    }

    pub fn inner_join(self, target: Queryable, connection: Condition) -> Self {
        self.join(JoinType::Inner, target, [connection])
    }

    pub fn left_join(self, target: Queryable, connection: Condition) -> Self {
        self.join(JoinType::Left, target, [connection])
    }

    pub fn cross_join(self, target: Queryable) -> Self {
        self.join(JoinType::Cross, target, [])
    }

    /// Join another copy of an entity; property fields reach it through
    /// `Field::ordinal(join_ordinal)`.
    pub fn self_join(
        mut self,
        join_type: JoinType,
        target: Queryable,
        join_ordinal: usize,
        connection: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.joins.push(JoinEntry {
            join_type,
            target,
            join_ordinal,
            connection: connection.into_iter().collect(),
        });
        self
    }

    pub fn combine(mut self, combine_type: CombineType, target: Queryable) -> Self {
        self.combines.push(CombineEntry {
            combine_type,
            target,
        });
        self
    }

    pub fn union(self, target: Queryable) -> Self {
        self.combine(CombineType::Union, target)
    }

    pub fn group_by<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.group_by.extend(fields);
        self
    }

    /// HAVING conditions.
    pub fn having(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        let having = self
            .having
            .get_or_insert_with(|| Box::new(Queryable::conditions_only(Vec::new())));
        having.conditions.extend(conditions);
        self
    }

    pub fn tree(
        mut self,
        data_field: impl Into<String>,
        parent_field: impl Into<String>,
        direction: TreeDirection,
    ) -> Self {
        self.tree = Some(TreeInfo {
            data_field: data_field.into(),
            parent_field: parent_field.into(),
            direction,
        });
        self
    }

    pub fn page(mut self, page: u64, size: u64) -> Self {
        self.paging = Some(PagingFilter::new(page, size));
        self
    }

    pub fn take(mut self, n: u64) -> Self {
        self.take = Some(n);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn count(mut self) -> Self {
        self.output = OutputType::Count;
        self
    }

    pub fn exists(mut self) -> Self {
        self.output = OutputType::Predicate;
        self
    }

    /// Use as an OR-connected group inside a parent's conditions.
    pub fn or_group(mut self) -> Condition {
        self.connector = Connector::Or;
        Condition::Group(Box::new(self))
    }

    /// Use as an AND-connected group inside a parent's conditions.
    pub fn and_group(mut self) -> Condition {
        self.connector = Connector::And;
        Condition::Group(Box::new(self))
    }
}
