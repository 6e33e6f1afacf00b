//! Rental schema: items, parties, bookings with their lines, ledger entries
//! and the catalog settings row.
//!
//! Built with the schema builder so the same migration runs on Postgres and
//! SQLite. Money columns are `NUMERIC(19, 4)`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: INVENTORY
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Identifier).string().not_null().default(""))
                    .col(ColumnDef::new(Items::Category).string().not_null().default(""))
                    .col(ColumnDef::new(Items::Brand).string().null())
                    .col(ColumnDef::new(Items::Model).string().null())
                    .col(ColumnDef::new(Items::Condition).string_len(16).not_null())
                    .col(ColumnDef::new(Items::Ownership).string_len(16).not_null())
                    .col(ColumnDef::new(Items::SupplierName).string().null())
                    .col(ColumnDef::new(Items::SupplierCost).decimal_len(19, 4).null())
                    .col(ColumnDef::new(Items::DailyRate).decimal_len(19, 4).not_null())
                    .col(ColumnDef::new(Items::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_items_status")
                    .table(Items::Table)
                    .col(Items::Status)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: PARTIES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Parties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parties::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Parties::Name).string().not_null())
                    .col(ColumnDef::new(Parties::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Parties::IdNumber).string().not_null().default(""))
                    .col(ColumnDef::new(Parties::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(Parties::Email).string().null())
                    .col(ColumnDef::new(Parties::Address).string().null())
                    .col(ColumnDef::new(Parties::ContactPerson).string().null())
                    .col(ColumnDef::new(Parties::Notes).text().null())
                    .col(ColumnDef::new(Parties::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Parties::CreditLimit).decimal_len(19, 4).null())
                    .col(
                        ColumnDef::new(Parties::Balance)
                            .decimal_len(19, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Parties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parties::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: BOOKINGS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::PartyId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::PartyName).string().not_null())
                    .col(ColumnDef::new(Bookings::StartDate).date().not_null())
                    .col(ColumnDef::new(Bookings::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Bookings::TotalAmount)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Bookings::Notes).text().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_party")
                            .from(Bookings::Table, Bookings::PartyId)
                            .to(Parties::Table, Parties::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_party")
                    .table(Bookings::Table)
                    .col(Bookings::PartyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookingLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BookingLines::BookingId).uuid().not_null())
                    .col(ColumnDef::new(BookingLines::Position).integer().not_null())
                    .col(ColumnDef::new(BookingLines::ItemId).uuid().not_null())
                    .col(ColumnDef::new(BookingLines::ItemName).string().not_null())
                    .col(
                        ColumnDef::new(BookingLines::DailyRate)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BookingLines::Days).integer().not_null())
                    .col(
                        ColumnDef::new(BookingLines::LineTotal)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_lines_booking")
                            .from(BookingLines::Table, BookingLines::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_lines_item")
                            .from(BookingLines::Table, BookingLines::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_booking_lines_item")
                    .table(BookingLines::Table)
                    .col(BookingLines::ItemId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: LEDGER
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LedgerEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LedgerEntries::PartyId).uuid().not_null())
                    .col(ColumnDef::new(LedgerEntries::BookingId).uuid().null())
                    .col(ColumnDef::new(LedgerEntries::EntryDate).date().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(LedgerEntries::Direction).string_len(8).not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Amount)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Method).string_len(16).null())
                    .col(ColumnDef::new(LedgerEntries::Description).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_party")
                            .from(LedgerEntries::Table, LedgerEntries::PartyId)
                            .to(Parties::Table, Parties::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_booking")
                            .from(LedgerEntries::Table, LedgerEntries::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_entries_party")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::PartyId)
                    .col(LedgerEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_entries_booking")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::BookingId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 5: SETTINGS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(CatalogSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CatalogSettings::AppName).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::ItemName).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::ItemsName).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::CategoryLabel).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::IdentifierLabel).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::Currency).string().not_null())
                    .col(ColumnDef::new(CatalogSettings::Categories).json().not_null())
                    .col(
                        ColumnDef::new(CatalogSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    Name,
    Identifier,
    Category,
    Brand,
    Model,
    Condition,
    Ownership,
    SupplierName,
    SupplierCost,
    DailyRate,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Parties {
    Table,
    Id,
    Name,
    Kind,
    IdNumber,
    Phone,
    Email,
    Address,
    ContactPerson,
    Notes,
    Status,
    CreditLimit,
    Balance,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    PartyId,
    PartyName,
    StartDate,
    EndDate,
    TotalAmount,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookingLines {
    Table,
    Id,
    BookingId,
    Position,
    ItemId,
    ItemName,
    DailyRate,
    Days,
    LineTotal,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    PartyId,
    BookingId,
    EntryDate,
    Kind,
    Direction,
    Amount,
    Method,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CatalogSettings {
    Table,
    Id,
    AppName,
    ItemName,
    ItemsName,
    CategoryLabel,
    IdentifierLabel,
    Currency,
    Categories,
    UpdatedAt,
}
