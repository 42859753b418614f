//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Name, 255).not_null())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::RegId, 64).not_null())
                    .col(string_len(User::Role, 32).not_null().default("student"))
                    .col(string_len_null(User::Branch, 64))
                    .col(string_len_null(User::Section, 64))
                    .col(string_len_null(User::Batch, 64))
                    .col(string_len_null(User::Phone, 64))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create overlords table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Overlord::Table)
                    .if_not_exists()
                    .col(uuid(Overlord::Id).primary_key())
                    .col(string_len(Overlord::Name, 255).not_null())
                    .col(string_len(Overlord::Email, 255).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(Overlord::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_overlords_email")
                    .table(Overlord::Table)
                    .col(Overlord::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create projects table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(string_len(Project::Title, 255).not_null())
                    .col(ColumnDef::new(Project::LeaderId).uuid().not_null())
                    .col(ColumnDef::new(Project::TeamMembers).text().not_null())
                    .col(ColumnDef::new(Project::Components).text().not_null())
                    .col(
                        string_len(Project::Status, 16)
                            .not_null()
                            .default("partial"),
                    )
                    .col(ColumnDef::new(Project::AssignedTeacherId).uuid())
                    .col(ColumnDef::new(Project::AssignedAdminId).uuid())
                    .col(ColumnDef::new(Project::Summary).text())
                    .col(ColumnDef::new(Project::PhotoKey).string_len(255))
                    .col(
                        timestamp_with_time_zone(Project::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Project::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_leader_id")
                            .from(Project::Table, Project::LeaderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_assigned_teacher_id")
                            .from(Project::Table, Project::AssignedTeacherId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_assigned_admin_id")
                            .from(Project::Table, Project::AssignedAdminId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_leader_id")
                    .table(Project::Table)
                    .col(Project::LeaderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_assigned_teacher_id")
                    .table(Project::Table)
                    .col(Project::AssignedTeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_assigned_admin_id")
                    .table(Project::Table)
                    .col(Project::AssignedAdminId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create achievements table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Achievement::Table)
                    .if_not_exists()
                    .col(uuid(Achievement::Id).primary_key())
                    .col(string_len(Achievement::Title, 255).not_null())
                    .col(ColumnDef::new(Achievement::Description).text().not_null())
                    .col(string_len(Achievement::Kind, 16).not_null())
                    .col(ColumnDef::new(Achievement::ImageKey).string_len(255))
                    .col(ColumnDef::new(Achievement::OwnerId).uuid().not_null())
                    .col(
                        timestamp_with_time_zone(Achievement::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_achievements_owner_id")
                            .from(Achievement::Table, Achievement::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievements_owner_id")
                    .table(Achievement::Table)
                    .col(Achievement::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create showcase_projects table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ShowcaseProject::Table)
                    .if_not_exists()
                    .col(uuid(ShowcaseProject::Id).primary_key())
                    .col(string_len(ShowcaseProject::Name, 255).not_null())
                    .col(
                        ColumnDef::new(ShowcaseProject::Description)
                            .text()
                            .not_null(),
                    )
                    .col(string_len(ShowcaseProject::GithubUrl, 255).not_null())
                    .col(ColumnDef::new(ShowcaseProject::ImageKey).string_len(255))
                    .col(
                        timestamp_with_time_zone(ShowcaseProject::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. Create admin_logs table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AdminLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(AdminLog::Category, 32).not_null())
                    .col(ColumnDef::new(AdminLog::Message).text().not_null())
                    .col(ColumnDef::new(AdminLog::Metadata).text())
                    .col(
                        timestamp_with_time_zone(AdminLog::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_logs_category")
                    .table(AdminLog::Table)
                    .col(AdminLog::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_logs_created_at")
                    .table(AdminLog::Table)
                    .col(AdminLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminLog::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShowcaseProject::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Achievement::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Overlord::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    RegId,
    Role,
    Branch,
    Section,
    Batch,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Overlord {
    #[sea_orm(iden = "overlords")]
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    Title,
    LeaderId,
    TeamMembers,
    Components,
    Status,
    AssignedTeacherId,
    AssignedAdminId,
    Summary,
    PhotoKey,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Achievement {
    #[sea_orm(iden = "achievements")]
    Table,
    Id,
    Title,
    Description,
    Kind,
    ImageKey,
    OwnerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ShowcaseProject {
    #[sea_orm(iden = "showcase_projects")]
    Table,
    Id,
    Name,
    Description,
    GithubUrl,
    ImageKey,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AdminLog {
    #[sea_orm(iden = "admin_logs")]
    Table,
    Id,
    Category,
    Message,
    Metadata,
    CreatedAt,
}
