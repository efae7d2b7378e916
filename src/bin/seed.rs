//! Seed the database with a small fixture set of profiles.
//!
//! Clears existing profiles first, so running it twice leaves the same
//! four-profile population, every one at rating 1500 with zero matches.

use ranked::config::Settings;
use ranked::models::{Education, Experience, NewProfile};
use ranked::services::{PostgresStore, RatingStore};

fn sample_profiles() -> Vec<NewProfile> {
    vec![
        NewProfile {
            name: "Alice Smith".to_string(),
            photo_url: "https://randomuser.me/api/portraits/women/1.jpg".to_string(),
            experiences: vec![
                Experience {
                    title: "Software Engineer Intern".to_string(),
                    company: "Google".to_string(),
                    description: "Worked on search algorithms".to_string(),
                },
                Experience {
                    title: "Research Assistant".to_string(),
                    company: "Northeastern University".to_string(),
                    description: "Machine learning research".to_string(),
                },
            ],
            education: Education {
                degree: "BS".to_string(),
                major: "Computer Science".to_string(),
                graduation_year: 2023,
            },
            linkedin_url: Some("https://linkedin.com/in/alice-smith".to_string()),
            github_url: Some("https://github.com/alicesmith".to_string()),
        },
        NewProfile {
            name: "Bob Johnson".to_string(),
            photo_url: "https://randomuser.me/api/portraits/men/1.jpg".to_string(),
            experiences: vec![
                Experience {
                    title: "Software Developer".to_string(),
                    company: "Amazon".to_string(),
                    description: "Worked on AWS services".to_string(),
                },
                Experience {
                    title: "Teaching Assistant".to_string(),
                    company: "Northeastern University".to_string(),
                    description: "Algorithms and data structures".to_string(),
                },
            ],
            education: Education {
                degree: "MS".to_string(),
                major: "Computer Science".to_string(),
                graduation_year: 2022,
            },
            linkedin_url: Some("https://linkedin.com/in/bob-johnson".to_string()),
            github_url: Some("https://github.com/bobjohnson".to_string()),
        },
        NewProfile {
            name: "Charlie Davis".to_string(),
            photo_url: "https://randomuser.me/api/portraits/men/2.jpg".to_string(),
            experiences: vec![
                Experience {
                    title: "Machine Learning Engineer".to_string(),
                    company: "Meta".to_string(),
                    description: "Worked on recommendation systems".to_string(),
                },
                Experience {
                    title: "Research Intern".to_string(),
                    company: "MIT".to_string(),
                    description: "Natural language processing".to_string(),
                },
            ],
            education: Education {
                degree: "PhD".to_string(),
                major: "Artificial Intelligence".to_string(),
                graduation_year: 2024,
            },
            linkedin_url: Some("https://linkedin.com/in/charlie-davis".to_string()),
            github_url: Some("https://github.com/charliedavis".to_string()),
        },
        NewProfile {
            name: "Diana Wilson".to_string(),
            photo_url: "https://randomuser.me/api/portraits/women/2.jpg".to_string(),
            experiences: vec![
                Experience {
                    title: "Full Stack Developer".to_string(),
                    company: "Microsoft".to_string(),
                    description: "Worked on Azure platform".to_string(),
                },
                Experience {
                    title: "Software Engineer Intern".to_string(),
                    company: "Northeastern University".to_string(),
                    description: "Campus IT systems".to_string(),
                },
            ],
            education: Education {
                degree: "BS".to_string(),
                major: "Computer Engineering".to_string(),
                graduation_year: 2023,
            },
            linkedin_url: Some("https://linkedin.com/in/diana-wilson".to_string()),
            github_url: Some("https://github.com/dianawilson".to_string()),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let settings = Settings::load()?;

    if settings.database.backend != "postgres" {
        eprintln!(
            "Seeding requires the postgres backend; the {:?} backend is process-local",
            settings.database.backend
        );
        return Ok(());
    }

    println!("Connecting to PostgreSQL...");
    let store = PostgresStore::connect(&settings.database.url, 5, 1).await?;

    println!("Clearing existing profiles...");
    let removed = store.clear_profiles().await?;
    println!("  removed {} profiles", removed);

    let mut created = 0;
    let mut failed = 0;

    for profile in sample_profiles() {
        let name = profile.name.clone();
        match store.insert_profile(profile).await {
            Ok(inserted) => {
                println!("  {} -> {}", inserted.name, inserted.profile_id);
                created += 1;
            }
            Err(e) => {
                eprintln!("Failed to seed {}: {}", name, e);
                failed += 1;
            }
        }
    }

    println!();
    println!("Done! Seeded {} profiles, {} failed", created, failed);

    Ok(())
}
