use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_data_plans_table::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_transactions_table::Migration),
        ]
    }
}

mod m20240101_000001_create_data_plans_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_data_plans_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DataPlans::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(DataPlans::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(DataPlans::Network).string().not_null())
                        .col(ColumnDef::new(DataPlans::DataSize).string().not_null())
                        .col(ColumnDef::new(DataPlans::Validity).string().not_null())
                        .col(ColumnDef::new(DataPlans::Price).big_integer().not_null())
                        .col(
                            ColumnDef::new(DataPlans::ProviderPlanId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DataPlans::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_data_plans_price")
                        .table(DataPlans::Table)
                        .col(DataPlans::Price)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DataPlans::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum DataPlans {
        Table,
        Id,
        Network,
        DataSize,
        Validity,
        Price,
        ProviderPlanId,
        CreatedAt,
    }
}

mod m20240101_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().not_null())
                        .col(ColumnDef::new(Products::Price).big_integer().not_null())
                        .col(ColumnDef::new(Products::ImageUrl).string().not_null())
                        .col(
                            ColumnDef::new(Products::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        Price,
        ImageUrl,
        InStock,
        CreatedAt,
    }
}

mod m20240101_000003_create_transactions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::TxRef)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Transactions::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Transactions::Beneficiary).string().not_null())
                        .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                        .col(ColumnDef::new(Transactions::PlanId).uuid().null())
                        .col(ColumnDef::new(Transactions::ProductId).uuid().null())
                        .col(
                            ColumnDef::new(Transactions::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::DeliveryReceipt).json().null())
                        .col(ColumnDef::new(Transactions::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_plan_id")
                                .from(Transactions::Table, Transactions::PlanId)
                                .to(DataPlans::Table, DataPlans::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_product_id")
                                .from(Transactions::Table, Transactions::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_status")
                        .table(Transactions::Table)
                        .col(Transactions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_created_at")
                        .table(Transactions::Table)
                        .col(Transactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Transactions {
        Table,
        Id,
        TxRef,
        Kind,
        Beneficiary,
        Amount,
        PlanId,
        ProductId,
        Status,
        DeliveryReceipt,
        CreatedAt,
    }

    #[derive(Iden)]
    enum DataPlans {
        Table,
        Id,
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
    }
}
