// Built-in demo recipes
//
// Used to top up thin result sets so a search never comes back empty, even
// with no network and an empty local store.

use crate::core::recipe::{Amount, Ingredient, Instructions, Provenance, Recipe};
use crate::sources::SourceRecord;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug)]
pub struct FixtureRecipe {
    pub id: u32,
    pub title: &'static str,
    pub image: &'static str,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub ingredients: &'static [(&'static str, f64, &'static str)],
    pub steps: &'static [&'static str],
}

static FIXTURES: &[FixtureRecipe] = &[
    FixtureRecipe {
        id: 101,
        title: "Classic Spaghetti Carbonara",
        image: "https://images.unsplash.com/photo-1612874742237-6526221588e3?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 25,
        servings: 4,
        ingredients: &[("Spaghetti", 400.0, "g"), ("Eggs", 4.0, "")],
        steps: &[
            "Cook spaghetti in boiling salted water until al dente.",
            "Fry pancetta in a pan until crisp.",
            "Whisk eggs and parmesan cheese together in a bowl.",
            "Drain pasta and toss with pancetta.",
            "Remove from heat and quickly mix in the egg mixture to create a creamy sauce.",
        ],
    },
    FixtureRecipe {
        id: 102,
        title: "Creamy Chicken Curry",
        image: "https://images.unsplash.com/photo-1604908176997-125f25cc6f3d?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 40,
        servings: 4,
        ingredients: &[("Chicken", 500.0, "g"), ("Coconut Milk", 400.0, "ml")],
        steps: &[
            "Sauté onions, garlic, and ginger until fragrant.",
            "Add curry spices and cook for another minute.",
            "Add chicken pieces and brown on all sides.",
            "Stir in coconut milk and simmer for 20 minutes.",
            "Serve hot with rice.",
        ],
    },
    FixtureRecipe {
        id: 103,
        title: "Homemade Pepperoni Pizza",
        image: "https://images.unsplash.com/photo-1565299624946-b28f40a0ae38?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 60,
        servings: 8,
        ingredients: &[("Dough", 1.0, "ball"), ("Pepperoni", 100.0, "g")],
        steps: &[
            "Preheat oven to 400°F (200°C).",
            "Roll out the pizza dough on a floured surface.",
            "Spread tomato sauce evenly over the dough.",
            "Sprinkle mozzarella cheese and top with pepperoni slices.",
            "Bake for 15-20 minutes until crust is golden.",
        ],
    },
    FixtureRecipe {
        id: 104,
        title: "Fresh Garden Salad",
        image: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 10,
        servings: 2,
        ingredients: &[("Lettuce", 1.0, "head"), ("Tomatoes", 2.0, "")],
        steps: &[
            "Wash and chop lettuce, tomatoes, and cucumbers.",
            "Place all vegetables in a large salad bowl.",
            "Drizzle with olive oil and vinegar dressing.",
            "Toss well to combine.",
            "Serve immediately.",
        ],
    },
    FixtureRecipe {
        id: 105,
        title: "Grilled Salmon with Asparagus",
        image: "https://images.unsplash.com/photo-1467003909585-2f8a7270028d?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 20,
        servings: 2,
        ingredients: &[("Salmon Fillet", 2.0, ""), ("Asparagus", 1.0, "bunch")],
        steps: &[
            "Season salmon fillets with salt, pepper, and lemon juice.",
            "Preheat grill to medium-high heat.",
            "Grill salmon for 4-5 minutes per side.",
            "Toss asparagus in olive oil and grill for 3-4 minutes.",
            "Serve salmon alongside asparagus.",
        ],
    },
    FixtureRecipe {
        id: 106,
        title: "Beef Tacos",
        image: "https://images.unsplash.com/photo-1551504734-5ee1c4a1479b?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 30,
        servings: 4,
        ingredients: &[("Ground Beef", 500.0, "g"), ("Taco Shells", 12.0, "")],
        steps: &[
            "Brown ground beef in a skillet over medium heat.",
            "Add taco seasoning and a splash of water.",
            "Simmer until sauce thickens.",
            "Warm taco shells in the oven.",
            "Fill shells with beef and top with cheese, lettuce, and salsa.",
        ],
    },
    FixtureRecipe {
        id: 107,
        title: "Berry Smoothie Bowl",
        image: "https://images.unsplash.com/photo-1577805947697-b98438db0745?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 5,
        servings: 1,
        ingredients: &[("Mixed Berries", 1.0, "cup"), ("Yogurt", 1.0, "cup")],
        steps: &[
            "Place frozen berries and yogurt in a blender.",
            "Blend until smooth and creamy.",
            "Pour mixture into a serving bowl.",
            "Top with granola, fresh fruit, and honey.",
        ],
    },
    FixtureRecipe {
        id: 108,
        title: "Mushroom Risotto",
        image: "https://images.unsplash.com/photo-1476124369491-e7addf5db371?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 45,
        servings: 4,
        ingredients: &[("Arborio Rice", 2.0, "cup"), ("Mushrooms", 200.0, "g")],
        steps: &[
            "Sauté mushrooms in butter until golden.",
            "Add arborio rice and toast for 1 minute.",
            "Gradually add hot broth, one ladle at a time, stirring constantly.",
            "Cook until rice is creamy and tender.",
            "Stir in parmesan cheese and butter before serving.",
        ],
    },
    FixtureRecipe {
        id: 109,
        title: "Classic Cheeseburger",
        image: "https://images.unsplash.com/photo-1568901346375-23c9450c58cd?auto=format&fit=crop&w=500&q=80",
        ready_in_minutes: 20,
        servings: 2,
        ingredients: &[("Beef Patty", 2.0, ""), ("Cheese", 2.0, "slices"), ("Bun", 2.0, "")],
        steps: &[
            "Season the beef patty with salt and pepper.",
            "Grill the patty over medium-high heat for 3-4 minutes per side.",
            "Place a slice of cheese on the patty during the last minute of cooking to melt.",
            "Toast the bun lightly.",
            "Assemble the burger with lettuce, tomato, and your favorite sauces.",
        ],
    },
];

pub fn normalize(fixture: &FixtureRecipe) -> Recipe {
    Recipe {
        id: fixture.id.to_string(),
        title: fixture.title.to_string(),
        image: Some(fixture.image.to_string()),
        ready_in_minutes: fixture.ready_in_minutes,
        servings: fixture.servings,
        ingredients: fixture
            .ingredients
            .iter()
            .map(|(name, amount, unit)| Ingredient::new(*name, Amount::Numeric(*amount), *unit))
            .collect(),
        instructions: Instructions::from_texts(fixture.steps.iter().copied()),
        source: Provenance::Synthetic,
    }
}

/// The fixture set. Can't fail, never touches the network.
pub struct Fixtures {
    recipes: &'static [FixtureRecipe],
    matcher: SkimMatcherV2,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            recipes: FIXTURES,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = SourceRecord> + '_ {
        self.recipes.iter().map(SourceRecord::Synthetic)
    }

    pub fn all(&self) -> Vec<Recipe> {
        self.records().filter_map(SourceRecord::normalize).collect()
    }

    /// Fixtures relevant to a query, in three tiers
    ///
    /// 1. Titles containing the query (case-insensitive). When any match,
    ///    only these are returned.
    /// 2. Otherwise a fuzzy title match, best score first. This is wider
    ///    than a plain substring filter: "chiken" finds the curry.
    /// 3. Otherwise the whole set, so there is always something to show.
    pub fn matching(&self, query: &str) -> Vec<Recipe> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.all();
        }

        let substring: Vec<&'static FixtureRecipe> = self
            .recipes
            .iter()
            .filter(|f| f.title.to_lowercase().contains(&query))
            .collect();
        if !substring.is_empty() {
            return substring.into_iter().map(normalize).collect();
        }

        let mut fuzzy: Vec<(i64, &'static FixtureRecipe)> = self
            .recipes
            .iter()
            .filter_map(|f| self.matcher.fuzzy_match(f.title, &query).map(|score| (score, f)))
            .collect();
        if !fuzzy.is_empty() {
            fuzzy.sort_by(|a, b| b.0.cmp(&a.0));
            return fuzzy.into_iter().map(|(_, f)| normalize(f)).collect();
        }

        self.all()
    }

    pub fn find(&self, id: &str) -> Option<Recipe> {
        let id: u32 = id.trim().parse().ok()?;
        self.recipes.iter().find(|f| f.id == id).map(normalize)
    }
}
