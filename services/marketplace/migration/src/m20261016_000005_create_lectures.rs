use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lectures::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lectures::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Lectures::Title).text().not_null())
                    .col(ColumnDef::new(Lectures::Content).json_binary().not_null())
                    .col(
                        ColumnDef::new(Lectures::Kind)
                            .text()
                            .not_null()
                            .default("text"),
                    )
                    .col(ColumnDef::new(Lectures::SectionId).uuid().not_null())
                    .col(
                        ColumnDef::new(Lectures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Lectures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lectures_section_id")
                            .from(Lectures::Table, Lectures::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Lectures::Table)
                    .col(Lectures::SectionId)
                    .name("idx_lectures_section_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lectures::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Lectures {
    Table,
    Id,
    Title,
    Content,
    Kind,
    SectionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
}
