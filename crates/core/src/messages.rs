//! Localized user-facing messages.
//!
//! Both storefronts are Bengali-language. Each error kind gets its own
//! message so the shopper can tell "fix your cart" apart from "try again".

/// The cart has no lines to order.
pub const CART_EMPTY: &str = "আপনার কার্ট খালি";

/// The cart references product IDs with an invalid shape.
pub const CART_INVALID_PRODUCTS: &str =
    "কার্টে অবৈধ পণ্য রয়েছে। অনুগ্রহ করে কার্ট থেকে সেগুলো সরিয়ে আবার চেষ্টা করুন।";

/// The cart references products that no longer exist.
pub const CART_UNAVAILABLE_PRODUCTS: &str =
    "কার্টের কিছু পণ্য আর পাওয়া যাচ্ছে না। অনুগ্রহ করে কার্ট আপডেট করুন।";

/// The cart could not be checked against the catalog.
pub const CART_NOT_VERIFIED: &str = "কার্ট যাচাই করা যায়নি। অনুগ্রহ করে আবার চেষ্টা করুন।";

/// The submitted total does not match the cart lines.
pub const ORDER_TOTAL_MISMATCH: &str = "অর্ডারের মোট মূল্য মেলেনি। অনুগ্রহ করে আবার চেষ্টা করুন।";

/// The order could not be written.
pub const ORDER_NOT_SAVED: &str = "আপনার অর্ডার সংরক্ষণ করা যায়নি। অনুগ্রহ করে আবার চেষ্টা করুন।";

/// The order may have been saved, but its confirmation was lost.
pub const ORDER_OUTCOME_UNKNOWN: &str =
    "আপনার অর্ডার গ্রহণ করা হয়ে থাকতে পারে। আবার অর্ডার করার আগে অর্ডারের তালিকা দেখুন।";

/// The order was placed.
pub const ORDER_PLACED: &str = "আপনার অর্ডার সফলভাবে গ্রহণ করা হয়েছে";

/// Orders could not be loaded from any source.
pub const ORDERS_NOT_LOADED: &str = "অর্ডার লোড করা যায়নি";

/// The order status could not be changed.
pub const STATUS_NOT_UPDATED: &str = "অর্ডারের অবস্থা পরিবর্তন করা যায়নি";

/// Display name for an order item whose product no longer exists.
#[must_use]
pub fn unknown_product(short_id: &str) -> String {
    format!("পণ্য #{short_id}")
}
