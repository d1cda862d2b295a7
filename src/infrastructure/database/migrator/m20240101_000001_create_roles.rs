//! Migration to create the roles table and its baseline rows

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use crate::domain::role::{ADMIN_ROLE, CUSTOMER_ROLE, ORGANIZER_ROLE};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::RoleId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::RoleName)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Roles::Description).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        let insert = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::RoleName, Roles::Description])
            .values_panic([ADMIN_ROLE.into(), "System administrator".into()])
            .values_panic([ORGANIZER_ROLE.into(), "Event organizer".into()])
            .values_panic([CUSTOMER_ROLE.into(), "Ticket buyer".into()])
            .to_owned();

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&insert)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Roles {
    Table,
    RoleId,
    RoleName,
    Description,
}
