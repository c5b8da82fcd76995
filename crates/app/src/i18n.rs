//! Localized reply rendering.
//!
//! Turns typed dialogue replies into Vietnamese or English chat text with inline buttons.

use std::fmt::Write as _;

use menubot::{
    carts::CartLine,
    dialogue::{ButtonPayload, MenuEntry, Reply, Response},
    language::Language,
    orders::OrderId,
};
use rusty_money::{Money, iso};

/// A reply ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub buttons: Vec<RenderedButton>,
}

/// An inline button with its label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedButton {
    pub label: String,
    pub payload: ButtonPayload,
}

/// The same text in Vietnamese and English.
type Text = (&'static str, &'static str);

const MENU_HEADER: Text = ("📋 Thực đơn hôm nay:", "📋 Today's menu:");
const MENU_FOOTER: Text = (
    "\n\nGõ /add <mã món> [số lượng] để thêm vào giỏ.",
    "\n\nType /add <item id> [quantity] to add to your cart.",
);
const MENU_EMPTY: Text = (
    "Hiện chưa có món nào để đặt.",
    "Nothing is available to order right now.",
);
const MENU_UNAVAILABLE: Text = (
    "⚠️ Thực đơn tạm thời không truy cập được, vui lòng thử lại sau.",
    "⚠️ The menu is temporarily unavailable, please try again later.",
);
const ADD_USAGE: Text = (
    "Cách dùng: /add <mã món> [số lượng], ví dụ /add F01 2",
    "Usage: /add <item id> [quantity], e.g. /add F01 2",
);
const CART_HEADER: Text = ("🛒 Giỏ hàng của bạn:", "🛒 Your cart:");
const TOTAL: Text = ("Tổng cộng", "Total");
const CART_EMPTY: Text = (
    "Giỏ hàng của bạn đang trống. Gõ /menu để chọn món.",
    "Your cart is empty. Type /menu to pick something.",
);
const CHECKOUT_IN_PROGRESS: Text = (
    "Bạn đang đặt hàng. Hoàn tất hoặc gõ /cancel trước khi thêm món.",
    "You are checking out. Finish or type /cancel before adding items.",
);
const ASK_PHONE: Text = (
    "📞 Vui lòng nhập số điện thoại của bạn:",
    "📞 Please enter your phone number:",
);
const ASK_ADDRESS: Text = (
    "📍 Vui lòng nhập địa chỉ giao hàng:",
    "📍 Please enter the delivery address:",
);
const REPROMPT_PHONE: Text = (
    "Số điện thoại không được để trống, vui lòng nhập lại:",
    "The phone number cannot be empty, please try again:",
);
const REPROMPT_ADDRESS: Text = (
    "Địa chỉ không được để trống, vui lòng nhập lại:",
    "The address cannot be empty, please try again:",
);
const SUMMARY_HEADER: Text = ("🧾 Xác nhận đơn hàng:", "🧾 Please confirm your order:");
const SUMMARY_FOOTER: Text = (
    "Bấm Xác nhận để đặt hàng.",
    "Press Confirm to place the order.",
);
const CHOOSE: Text = (
    "Vui lòng bấm Xác nhận hoặc Huỷ.",
    "Please press Confirm or Cancel.",
);
const ORDER_FAILED: Text = (
    "⚠️ Không lưu được đơn hàng. Giỏ hàng vẫn được giữ, bạn có thể bấm Xác nhận lại.",
    "⚠️ We could not save your order. Your cart is kept, you can press Confirm again.",
);
const CHECKOUT_CANCELLED: Text = (
    "Đã huỷ đặt hàng. Giỏ hàng vẫn được giữ.",
    "Checkout cancelled. Your cart is kept.",
);
const DECLINED: Text = (
    "Đã huỷ đơn. Giỏ hàng vẫn được giữ, gõ /checkout để đặt lại.",
    "Order cancelled. Your cart is kept, type /checkout to try again.",
);
const CART_CLEARED: Text = ("🗑️ Đã xoá giỏ hàng.", "🗑️ Your cart was cleared.");
const NOTHING_TO_CANCEL: Text = ("Không có gì để huỷ.", "Nothing to cancel.");
const LANGUAGE_USAGE: Text = (
    "Cách dùng: /lang vi hoặc /lang en",
    "Usage: /lang vi or /lang en",
);
const HELP: Text = (
    "Các lệnh:\n/menu - xem thực đơn\n/add <mã> [số lượng] - thêm món\n/cart - xem giỏ hàng\n/checkout - đặt hàng\n/cancel - huỷ\n/lang vi|en - đổi ngôn ngữ",
    "Commands:\n/menu - show the menu\n/add <id> [quantity] - add an item\n/cart - show your cart\n/checkout - place the order\n/cancel - cancel\n/lang vi|en - change language",
);
const SESSION_EXPIRED: Text = (
    "Phiên đặt hàng này đã kết thúc. Gõ /cart để xem giỏ hàng.",
    "This checkout is no longer open. Type /cart to see your cart.",
);
const CHECKOUT_BUTTON: Text = ("🧾 Đặt hàng", "🧾 Checkout");
const CONFIRM_BUTTON: Text = ("✅ Xác nhận", "✅ Confirm");
const DECLINE_BUTTON: Text = ("❌ Huỷ", "❌ Cancel");

/// Picks the text for `language`.
const fn tr(language: Language, (vi, en): Text) -> &'static str {
    match language {
        Language::Vi => vi,
        Language::En => en,
    }
}

/// Formats an amount of đồng.
pub fn price(amount: u64) -> String {
    let minor = i64::try_from(amount).unwrap_or(i64::MAX);

    format!("{}", Money::from_minor(minor, iso::VND))
}

fn button_label(language: Language, payload: &ButtonPayload) -> String {
    let label = match payload {
        ButtonPayload::Checkout => tr(language, CHECKOUT_BUTTON),
        ButtonPayload::Confirm => tr(language, CONFIRM_BUTTON),
        ButtonPayload::Decline => tr(language, DECLINE_BUTTON),
        ButtonPayload::Unknown(raw) => raw.as_str(),
    };

    label.to_string()
}

fn menu_text(language: Language, entries: &[MenuEntry]) -> String {
    let mut text = tr(language, MENU_HEADER).to_string();

    for entry in entries {
        _ = write!(text, "\n• {} · {}: {}", entry.id, entry.name, price(entry.price));
    }

    text.push_str(tr(language, MENU_FOOTER));

    text
}

fn lines_text(language: Language, lines: &[CartLine], total: u64) -> String {
    let mut text = String::new();

    for line in lines {
        _ = writeln!(
            text,
            "• {} x{}: {}",
            line.name,
            line.quantity,
            price(line.subtotal())
        );
    }

    _ = write!(text, "{}: {}", tr(language, TOTAL), price(total));

    text
}

fn welcome_text(language: Language, menu_size: usize) -> String {
    match language {
        Language::Vi => {
            format!("👋 Chào mừng bạn!\nHiện có {menu_size} món trong thực đơn. Gõ /menu để xem.")
        }
        Language::En => {
            format!("👋 Welcome!\nThere are {menu_size} items on the menu. Type /menu to see them.")
        }
    }
}

fn lookup_text(language: Language, reply: &Reply) -> String {
    match (language, reply) {
        (Language::Vi, Reply::ItemNotFound { id }) => {
            format!("❓ Không tìm thấy món có mã {id}. Gõ /menu để xem thực đơn.")
        }
        (Language::En, Reply::ItemNotFound { id }) => {
            format!("❓ No item with id {id}. Type /menu to see the menu.")
        }
        (Language::Vi, Reply::ItemSoldOut { name }) => format!("😔 {name} đã hết hàng."),
        (Language::En, Reply::ItemSoldOut { name }) => format!("😔 {name} is sold out."),
        (Language::Vi, Reply::AddedToCart { name, quantity, in_cart }) => {
            format!("🛒 Đã thêm {quantity} x {name} vào giỏ (hiện có {in_cart}).")
        }
        (Language::En, Reply::AddedToCart { name, quantity, in_cart }) => {
            format!("🛒 Added {quantity} x {name} to your cart ({in_cart} in cart).")
        }
        (Language::Vi, Reply::UnknownCommand(name)) => {
            format!("Không có lệnh /{name}. Gõ /help để xem các lệnh.")
        }
        (Language::En, Reply::UnknownCommand(name)) => {
            format!("There is no /{name} command. Type /help for the list.")
        }
        _ => String::new(),
    }
}

fn order_placed_text(language: Language, order_id: OrderId, total: u64) -> String {
    match language {
        Language::Vi => format!(
            "🎉 Đặt hàng thành công! Mã đơn #{order_id}, tổng {}. Cảm ơn bạn!",
            price(total)
        ),
        Language::En => format!(
            "🎉 Order placed! Order #{order_id}, total {}. Thank you!",
            price(total)
        ),
    }
}

fn body(language: Language, reply: &Reply) -> String {
    let fixed = match reply {
        Reply::Welcome { menu_size } => return welcome_text(language, *menu_size),
        Reply::Menu(entries) => return menu_text(language, entries),
        Reply::ItemNotFound { .. }
        | Reply::ItemSoldOut { .. }
        | Reply::AddedToCart { .. }
        | Reply::UnknownCommand(_) => return lookup_text(language, reply),
        Reply::Cart { lines, total } => {
            return format!(
                "{}\n{}",
                tr(language, CART_HEADER),
                lines_text(language, lines, *total)
            );
        }
        Reply::Summary {
            lines,
            total,
            phone,
            address,
        } => {
            return format!(
                "{}\n{}\n📞 {phone}\n📍 {address}\n\n{}",
                tr(language, SUMMARY_HEADER),
                lines_text(language, lines, *total),
                tr(language, SUMMARY_FOOTER)
            );
        }
        Reply::OrderPlaced { order_id, total } => {
            return order_placed_text(language, *order_id, *total);
        }
        Reply::LanguageChanged(Language::Vi) => "Đã chuyển sang tiếng Việt.",
        Reply::LanguageChanged(Language::En) => "Switched to English.",
        Reply::MenuEmpty => tr(language, MENU_EMPTY),
        Reply::MenuUnavailable => tr(language, MENU_UNAVAILABLE),
        Reply::AddUsage => tr(language, ADD_USAGE),
        Reply::CartEmpty => tr(language, CART_EMPTY),
        Reply::CheckoutInProgress => tr(language, CHECKOUT_IN_PROGRESS),
        Reply::AskPhone => tr(language, ASK_PHONE),
        Reply::AskAddress => tr(language, ASK_ADDRESS),
        Reply::RepromptPhone => tr(language, REPROMPT_PHONE),
        Reply::RepromptAddress => tr(language, REPROMPT_ADDRESS),
        Reply::ChooseConfirmOrDecline => tr(language, CHOOSE),
        Reply::OrderFailed => tr(language, ORDER_FAILED),
        Reply::CheckoutCancelled => tr(language, CHECKOUT_CANCELLED),
        Reply::Declined => tr(language, DECLINED),
        Reply::CartCleared => tr(language, CART_CLEARED),
        Reply::NothingToCancel => tr(language, NOTHING_TO_CANCEL),
        Reply::LanguageUsage => tr(language, LANGUAGE_USAGE),
        Reply::Help => tr(language, HELP),
        Reply::SessionExpired => tr(language, SESSION_EXPIRED),
    };

    fixed.to_string()
}

/// Renders `response` in its language.
pub fn render(response: &Response) -> Rendered {
    let language = response.language;

    Rendered {
        text: body(language, &response.reply),
        buttons: response
            .reply
            .choices()
            .iter()
            .map(|payload| RenderedButton {
                label: button_label(language, payload),
                payload: payload.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use menubot::catalog::ItemId;

    use super::*;

    fn cart_line() -> CartLine {
        CartLine {
            item_id: ItemId::new("F01"),
            name: "Phở bò".to_string(),
            unit_price: 50_000,
            quantity: 2,
        }
    }

    #[test]
    fn summary_has_lines_details_and_buttons() {
        let rendered = render(&Response::new(
            Language::En,
            Reply::Summary {
                lines: vec![cart_line()],
                total: 100_000,
                phone: "0900000000".to_string(),
                address: "123 Main St".to_string(),
            },
        ));

        assert!(rendered.text.contains("Phở bò x2"), "{}", rendered.text);
        assert!(rendered.text.contains("0900000000"), "{}", rendered.text);
        assert!(rendered.text.contains("123 Main St"), "{}", rendered.text);
        assert_eq!(
            rendered
                .buttons
                .iter()
                .map(|button| button.payload.clone())
                .collect::<Vec<_>>(),
            vec![ButtonPayload::Confirm, ButtonPayload::Decline]
        );
        assert_eq!(
            rendered.buttons.first().map(|button| button.label.as_str()),
            Some("✅ Confirm")
        );
    }

    #[test]
    fn same_reply_differs_by_language() {
        let vi = render(&Response::new(Language::Vi, Reply::AskPhone));
        let en = render(&Response::new(Language::En, Reply::AskPhone));

        assert_ne!(vi.text, en.text);
        assert!(vi.buttons.is_empty(), "prompts carry no buttons");
    }

    #[test]
    fn order_confirmation_names_the_order() {
        let rendered = render(&Response::new(
            Language::Vi,
            Reply::OrderPlaced {
                order_id: OrderId::new(10_001),
                total: 100_000,
            },
        ));

        assert!(rendered.text.contains("#10001"), "{}", rendered.text);
        assert!(rendered.text.contains(&price(100_000)), "{}", rendered.text);
    }

    #[test]
    fn cart_offers_checkout() {
        let rendered = render(&Response::new(
            Language::Vi,
            Reply::Cart {
                lines: vec![cart_line()],
                total: 100_000,
            },
        ));

        assert_eq!(
            rendered.buttons.first().map(|button| &button.payload),
            Some(&ButtonPayload::Checkout)
        );
    }

    #[test]
    fn prices_keep_every_digit_group() {
        let formatted = price(1_250_000);

        assert!(
            formatted.contains("250") && formatted.contains("000"),
            "unexpected price format {formatted}"
        );
    }
}
