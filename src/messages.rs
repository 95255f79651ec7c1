//! User-facing strings (pt-BR).
//!
//! Auth error codes map to different messages depending on which flow
//! reported them; see [`auth_message`].

use crate::AuthErrorCode;

pub const TITLE_SUCCESS: &str = "Sucesso";
pub const TITLE_ERROR: &str = "Erro";
pub const TITLE_INFO: &str = "Aviso";
pub const TITLE_LOGOUT: &str = "Logout";

pub const EXIT_TITLE: &str = "Sair do app";
pub const EXIT_MESSAGE: &str = "Deseja realmente sair?";
pub const EXIT_CANCEL: &str = "Cancelar";
pub const EXIT_CONFIRM: &str = "Sair";

pub const FILL_ALL_FIELDS: &str = "Por favor, preencha todos os campos.";
pub const LOGIN_SUCCESS: &str = "Login realizado com sucesso!";
pub const PASSWORDS_DO_NOT_MATCH: &str = "As senhas não coincidem.";
pub const SIGN_UP_SUCCESS: &str = "Cadastro realizado com sucesso!";
pub const ENTER_VALID_EMAIL: &str = "Digite um e-mail válido!";
pub const RESET_EMAIL_SENT: &str = "E-mail de recuperação enviado! Verifique sua caixa de entrada.";
pub const SETTINGS_SAVED: &str = "Configurações salvas com sucesso!";
pub const SETTINGS_SAVE_FAILED: &str = "Erro ao salvar configurações.";
pub const ACTUATOR_UPDATE_FAILED: &str = "Erro ao atualizar a bomba.";
pub const INVALID_NUMBER: &str = "Informe apenas números.";
pub const NEW_PASSWORD_TOO_SHORT: &str = "A nova senha deve ter pelo menos 6 caracteres.";
pub const CURRENT_PASSWORD_REQUIRED: &str = "Informe a senha atual para confirmar.";
pub const PASSWORD_UPDATED: &str = "Senha atualizada com sucesso!";
pub const SIGNED_OUT: &str = "Você saiu da sua conta.";
pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
pub const LOAD_FAILED: &str = "Erro ao carregar dados.";

pub const DEFAULT_USER_NAME: &str = "Usuário";
pub const USER_NAME_LOAD_FAILED: &str = "Erro ao carregar";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DATA: &str = "Nenhum dado disponível";

/// Auth flows with their own error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SignIn,
    SignUp,
    PasswordReset,
    PasswordChange,
    SignOut,
}

/// The message shown when `flow` fails with `code`.
pub fn auth_message(flow: AuthFlow, code: &AuthErrorCode) -> &'static str {
    // ---
    use AuthErrorCode as C;

    match (flow, code) {
        (AuthFlow::SignIn, C::UserNotFound) => "Usuário não encontrado.",
        (AuthFlow::SignIn, C::WrongPassword) => "Senha incorreta.",
        (AuthFlow::SignIn, C::InvalidEmail) => "E-mail inválido.",
        (AuthFlow::SignIn, C::InvalidCredential) => "E-mail ou senha inválidos.",
        (AuthFlow::SignIn, _) => "Ocorreu um erro ao fazer login.",

        (AuthFlow::SignUp, C::InvalidEmail) => "E-mail inválido.",
        (AuthFlow::SignUp, C::WeakPassword) => "A senha deve ter pelo menos 6 caracteres.",
        (AuthFlow::SignUp, C::EmailAlreadyInUse) => "Este e-mail já está cadastrado.",
        (AuthFlow::SignUp, _) => "Erro desconhecido ao cadastrar.",

        (AuthFlow::PasswordReset, C::UserNotFound) => "E-mail não encontrado.",
        (AuthFlow::PasswordReset, C::InvalidEmail) => "Formato de e-mail inválido.",
        (AuthFlow::PasswordReset, _) => "Ocorreu um erro ao enviar o e-mail.",

        (AuthFlow::PasswordChange, C::InvalidCredential | C::WrongPassword) => "Senha atual incorreta.",
        (AuthFlow::PasswordChange, C::WeakPassword) => "A nova senha é muito fraca.",
        (AuthFlow::PasswordChange, C::RequiresRecentLogin) => {
            "Por segurança, faça login novamente para alterar a senha."
        }
        (AuthFlow::PasswordChange, _) => "Erro ao alterar a senha.",

        (AuthFlow::SignOut, _) => "Erro ao sair da conta.",
    }
}
