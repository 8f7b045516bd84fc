use crate::api::{Category, MenuEntry};

/// Fixed menu, in display order: (name, category, price, description, glyph)
const STANDARD_MENU: [(&str, Category, u32, &str, &str); 16] = [
    ("Classic Burger", Category::Burgers, 299, "Juicy aloo patty with lettuce, tomato, and special sauce", "🍔"),
    ("Cheese Burger", Category::Burgers, 349, "Double cheese with premium aloo patty", "🍔"),
    ("Chicken Burger", Category::Burgers, 279, "Crispy chicken fillet with mayo and lettuce", "🍔"),
    ("Veggie Burger", Category::Burgers, 249, "Plant-based patty with fresh vegetables", "🍔"),
    ("Margherita Pizza", Category::Pizza, 399, "Classic cheese pizza with fresh basil", "🍕"),
    ("Pepperoni Pizza", Category::Pizza, 499, "Loaded with pepperoni and mozzarella", "🍕"),
    ("Veggie Supreme Pizza", Category::Pizza, 449, "Fresh vegetables with cheese blend", "🍕"),
    ("BBQ Chicken Pizza", Category::Pizza, 479, "BBQ sauce, chicken, and onions", "🍕"),
    ("French Fries", Category::Sides, 99, "Crispy golden fries with seasoning", "🍟"),
    ("Chicken Nuggets", Category::Sides, 149, "6 pieces of crispy chicken nuggets", "🍗"),
    ("Onion Rings", Category::Sides, 129, "Crispy battered onion rings", "🧅"),
    ("Garlic Bread", Category::Sides, 119, "Toasted bread with garlic butter", "🥖"),
    ("Coca Cola", Category::Drinks, 49, "Chilled soft drink - 330ml", "🥤"),
    ("Sprite", Category::Drinks, 49, "Refreshing lemon drink - 330ml", "🥤"),
    ("Chocolate Shake", Category::Drinks, 149, "Thick chocolate milkshake", "🥤"),
    ("Mango Smoothie", Category::Drinks, 129, "Fresh mango blended smoothie", "🥤"),
];

/// The menu held by the server.
///
/// Built once at startup and never modified afterwards, so it can be shared between worker
/// threads without locking.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<MenuEntry>,
}

impl Catalog {
    /// The sixteen entries the restaurant sells, with ids 1 to 16
    pub fn standard() -> Catalog {
        let entries = STANDARD_MENU
            .iter()
            .zip(1..)
            .map(|(&(name, category, price, description, image), id)| MenuEntry {
                id,
                name: name.to_string(),
                category,
                price,
                description: description.to_string(),
                image: image.to_string(),
            })
            .collect();
        Catalog { entries }
    }

    /// Build a catalog from arbitrary entries (used by tests and the client side snapshot)
    pub fn from_entries(entries: Vec<MenuEntry>) -> Catalog {
        Catalog { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn get(&self, id: u32) -> Option<&MenuEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keep only the entries of the given category, or everything when `None`
pub fn filter_by_category(entries: &[MenuEntry], category: Option<Category>) -> Vec<&MenuEntry> {
    entries
        .iter()
        .filter(|entry| category.map_or(true, |c| entry.category == c))
        .collect()
}
