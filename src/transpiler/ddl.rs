//! Schema statements from entity metadata.

use crate::ast::{MigrationAction, MigrationCommand};
use crate::error::{ForgeError, ForgeResult};
use crate::metadata::EntityDef;
use crate::transpiler::statement::Statement;
use crate::transpiler::Translator;

impl Translator<'_> {
    pub(crate) fn build_migration(&self, command: &MigrationCommand) -> ForgeResult<Vec<Statement>> {
        let mut scripts = Vec::new();
        for action in &command.actions {
            match action {
                MigrationAction::CreateTable {
                    entity,
                    if_not_exists,
                } => {
                    let def = self.metadata.entity(entity)?;
                    scripts.push(self.build_create_table(def, *if_not_exists)?);
                    for index in &def.indexes {
                        scripts.push(self.build_create_index(def, &index.name, &index.properties, index.unique)?);
                    }
                }
                MigrationAction::DropTable { entity, if_exists } => {
                    scripts.push(self.generator.drop_table(&self.table_name(entity)?, *if_exists));
                }
                MigrationAction::AddColumn { entity, property } => {
                    let field = self.metadata.field(entity, property)?;
                    scripts.push(
                        self.generator
                            .add_column(&self.table_name(entity)?, &self.generator.column_definition(field)),
                    );
                }
                MigrationAction::DropColumn { entity, column } => {
                    scripts.push(format!(
                        "ALTER TABLE {} DROP COLUMN {}",
                        self.table_name(entity)?,
                        self.generator.quote_identifier(column)
                    ));
                }
                MigrationAction::RenameColumn { entity, from, to } => {
                    scripts.push(self.generator.rename_column(&self.table_name(entity)?, from, to));
                }
                MigrationAction::CreateIndex {
                    entity,
                    name,
                    properties,
                    unique,
                } => {
                    let def = self.metadata.entity(entity)?;
                    scripts.push(self.build_create_index(def, name, properties, *unique)?);
                }
                MigrationAction::DropIndex { entity, name } => {
                    scripts.push(self.generator.drop_index(&self.table_name(entity)?, name));
                }
            }
        }
        Ok(scripts
            .into_iter()
            .map(|script| Statement {
                script,
                parameters: Vec::new(),
            })
            .collect())
    }

    fn build_create_table(&self, def: &EntityDef, if_not_exists: bool) -> ForgeResult<String> {
        if def.fields.is_empty() {
            return Err(ForgeError::InvalidValue(format!(
                "entity '{}' has no fields",
                def.name
            )));
        }
        let mut lines: Vec<String> = def
            .fields
            .iter()
            .map(|f| format!("    {}", self.generator.column_definition(f)))
            .collect();

        let keys: Vec<_> = def.primary_key_fields().collect();
        let inline_key = self.generator.inline_identity_key() && keys.iter().any(|k| k.identity);
        if !keys.is_empty() && !inline_key {
            let columns: Vec<String> = keys
                .iter()
                .map(|k| self.generator.quote_identifier(k.column_name()))
                .collect();
            lines.push(format!("    PRIMARY KEY ({})", columns.join(", ")));
        }

        Ok(self
            .generator
            .create_table(&self.table_name(&def.name)?, &lines.join(",\n"), if_not_exists))
    }

    fn build_create_index(
        &self,
        def: &EntityDef,
        name: &str,
        properties: &[String],
        unique: bool,
    ) -> ForgeResult<String> {
        let mut columns = Vec::with_capacity(properties.len());
        for property in properties {
            let field = def
                .field(property)
                .ok_or_else(|| ForgeError::unknown_field(&def.name, property))?;
            columns.push(self.generator.quote_identifier(field.column_name()));
        }
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.generator.quote_identifier(name),
            self.table_name(&def.name)?,
            columns.join(", ")
        ))
    }
}
