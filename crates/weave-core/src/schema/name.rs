use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Case conversions for model and accessor names.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    pub parts: Vec<String>,
}

impl Name {
    pub fn new(src: &str) -> Self {
        let snake = src.to_snake_case();
        let parts = snake.split('_').map(String::from).collect();
        Self { parts }
    }

    pub fn camel_case(&self) -> String {
        self.snake_case().to_lower_camel_case()
    }

    pub fn upper_camel_case(&self) -> String {
        self.snake_case().to_upper_camel_case()
    }

    pub fn snake_case(&self) -> String {
        self.parts.join("_")
    }

    /// Pluralizes the last word only, so `OrderItem` becomes `orderItems`.
    pub fn plural(&self) -> Name {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut() {
            *last = pluralizer::pluralize(last, 2, false);
        }
        Name { parts }
    }
}
