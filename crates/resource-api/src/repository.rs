//! In-memory resource repository seeded with reference consumer data.
//!
//! Stands in for the relational store of a production data holder. Built
//! once at startup and shared read-only across handlers; identifiers held
//! here are internal and must pass through the ID Permanence codec before
//! they reach a response.

use std::collections::HashMap;

use common::protocol::{
    CommonCustomer, EnergyAccount, EnergyAccountPlan, EnergyConcession, Person,
};

struct CustomerRecord {
    customer: CommonCustomer,
    accounts: Vec<EnergyAccount>,
}

/// Read-only store of customers, their energy accounts, and concessions.
pub struct ResourceRepository {
    customers: HashMap<String, CustomerRecord>,
    concessions: HashMap<String, Vec<EnergyConcession>>,
}

impl ResourceRepository {
    /// Build the repository with the reference data set.
    pub fn seeded() -> Self {
        let mut customers = HashMap::new();
        let mut concessions = HashMap::new();

        // Mary Moss: energy customer with a run of numbered accounts.
        let moss_accounts: Vec<EnergyAccount> = (1..=5)
            .map(|n| EnergyAccount {
                account_id: format!("00112233{n:02}"),
                account_number: format!("4444{n:03}"),
                display_name: Some(format!("Electricity account {n}")),
                creation_date: "2020-01-15".into(),
                plans: vec![EnergyAccountPlan {
                    nickname: None,
                    service_point_ids: vec![format!("30012345678{n:02}")],
                }],
            })
            .collect();
        customers.insert(
            "mmoss".to_string(),
            CustomerRecord {
                customer: CommonCustomer {
                    customer_u_type: "person".into(),
                    person: Person {
                        last_updated_time: "2021-07-01T00:00:00Z".into(),
                        first_name: "Mary".into(),
                        last_name: "Moss".into(),
                    },
                },
                accounts: moss_accounts,
            },
        );
        concessions.insert(
            "0011223301".to_string(),
            vec![EnergyConcession {
                concession_type: "FIXED_AMOUNT".into(),
                display_name: "Annual Electricity Concession".into(),
                additional_info: None,
                additional_info_uri: None,
                start_date: "2020-01-01".into(),
                end_date: "2020-12-31".into(),
                discount_frequency: Some("PER_INVOICE".into()),
                amount: Some("100.00".into()),
                percentage: None,
                applied_to: vec!["INVOICE".into()],
            }],
        );

        // Steve Kennedy: energy customer, single account, no concessions.
        customers.insert(
            "sken".to_string(),
            CustomerRecord {
                customer: CommonCustomer {
                    customer_u_type: "person".into(),
                    person: Person {
                        last_updated_time: "2021-07-01T00:00:00Z".into(),
                        first_name: "Steve".into(),
                        last_name: "Kennedy".into(),
                    },
                },
                accounts: vec![EnergyAccount {
                    account_id: "1122334455".into(),
                    account_number: "5555001".into(),
                    display_name: Some("Gas account".into()),
                    creation_date: "2019-06-20".into(),
                    plans: vec![EnergyAccountPlan {
                        nickname: Some("home".into()),
                        service_point_ids: vec![],
                    }],
                }],
            },
        );

        Self {
            customers,
            concessions,
        }
    }

    /// Look up a customer's profile by login id.
    pub fn customer_by_login_id(&self, login_id: &str) -> Option<CommonCustomer> {
        self.customers
            .get(login_id)
            .map(|record| record.customer.clone())
    }

    /// All energy accounts for a login id, in seed order.
    pub fn accounts_for_login_id(&self, login_id: &str) -> Vec<EnergyAccount> {
        self.customers
            .get(login_id)
            .map(|record| record.accounts.clone())
            .unwrap_or_default()
    }

    /// Whether the internal account id exists at all.
    pub fn can_access_account(&self, account_id: &str) -> bool {
        self.customers
            .values()
            .any(|record| record.accounts.iter().any(|a| a.account_id == account_id))
    }

    /// Concessions attached to an internal account id.
    pub fn concessions_for_account(&self, account_id: &str) -> Vec<EnergyConcession> {
        self.concessions
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of seeded customers, reported by the health endpoint.
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }
}
