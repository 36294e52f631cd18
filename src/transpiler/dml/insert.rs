use crate::ast::{Field, Value};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::fields::{FieldLocation, FieldSpot, QueryLocation};
use crate::transpiler::Translator;

impl Translator<'_> {
    /// INSERT statement and, when the entity has an identity the caller did
    /// not supply, the read-back select list for it.
    pub(crate) fn build_insert(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        values: &[(String, Value)],
    ) -> ForgeResult<(String, Option<String>)> {
        if values.is_empty() {
            return Err(ForgeError::InvalidValue(format!(
                "insert into '{}' has no values",
                entity_name
            )));
        }
        let entity = self.metadata.entity(entity_name)?;
        let spot = FieldSpot::new(QueryLocation::Top, FieldLocation::InsertValue);

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        for (property, value) in values {
            let field = entity
                .field(property)
                .ok_or_else(|| ForgeError::unknown_field(entity_name, property))?;
            columns.push(self.generator.quote_identifier(field.column_name()));
            placeholders.push(self.format_field(cx, &Field::constant(value.clone()), spot)?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name(entity_name)?,
            columns.join(", "),
            placeholders.join(", ")
        );
        let read_back = entity
            .identity_field()
            .filter(|identity| !values.iter().any(|(p, _)| *p == identity.property))
            .map(|identity| {
                format!(
                    "{} AS {}",
                    self.generator.last_identity(),
                    self.generator.quote_identifier(&identity.property)
                )
            });
        Ok((sql, read_back))
    }
}
